use std::collections::VecDeque;

/// Fixed-length voltage history, oldest sample first.
///
/// The length never changes after construction: every push drops the oldest
/// sample.
#[derive(Clone, Debug, PartialEq)]
pub struct VoltageTrace {
    samples: VecDeque<f64>,
}

impl VoltageTrace {
    pub fn filled(len: usize, value: f64) -> Self {
        VoltageTrace {
            samples: std::iter::repeat_n(value, len).collect(),
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.samples.pop_front().is_some() {
            self.samples.push_back(value);
        }
    }

    pub fn fill(&mut self, value: f64) {
        self.samples.iter_mut().for_each(|sample| *sample = value);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::VoltageTrace;
    use itertools::assert_equal;

    #[test]
    fn filled_trace() {
        let sut = VoltageTrace::filled(200, -70.0);
        assert_eq!(sut.len(), 200);
        assert!(sut.iter().all(|v| v == -70.0));
    }

    #[test]
    fn push_keeps_length() {
        let mut sut = VoltageTrace::filled(4, 0.0);
        for i in 1..=10 {
            sut.push(i as f64);
            assert_eq!(sut.len(), 4);
        }
        assert_equal(sut.iter(), [7.0, 8.0, 9.0, 10.0]);
        assert_eq!(sut.latest(), Some(10.0));
    }

    #[test]
    fn oldest_first() {
        let mut sut = VoltageTrace::filled(3, -70.0);
        sut.push(40.0);
        sut.push(-80.0);
        assert_equal(sut.iter(), [-70.0, 40.0, -80.0]);
    }

    #[test]
    fn fill_overwrites_everything() {
        let mut sut = VoltageTrace::filled(3, -70.0);
        sut.push(40.0);
        sut.fill(-70.0);
        assert_equal(sut.iter(), [-70.0, -70.0, -70.0]);
    }

    #[test]
    fn empty_trace_stays_empty() {
        let mut sut = VoltageTrace::filled(0, -70.0);
        sut.push(1.0);
        assert!(sut.is_empty());
        assert_eq!(sut.latest(), None);
    }
}
