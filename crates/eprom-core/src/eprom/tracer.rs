use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

pub mod macros;
pub mod traceable;
pub use traceable::Traceable;

pub static TRACER: Lazy<Mutex<Tracer>> = Lazy::new(|| Mutex::new(Tracer::new(4096)));

/// Which part of the image lifecycle an entry came from
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Boot,
    Header,
    Bank,
    Persist,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Phase::Boot => "BOOT",
            Phase::Header => "HEADER",
            Phase::Bank => "BANK",
            Phase::Persist => "PERSIST",
        };
        f.write_str(tag)
    }
}

struct Entry {
    seq: u64,
    phase: Phase,
    text: String,
}

/// Post-mortem record of boots and loads. Oldest entries fall off once
/// `capacity` is reached; sequence numbers keep counting.
pub struct Tracer {
    entries: VecDeque<Entry>,
    capacity: usize,
    next_seq: u64,
}

impl Tracer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    pub fn record(&mut self, phase: Phase, text: String) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Entry {
            seq: self.next_seq,
            phase,
            text,
        });
        self.next_seq += 1;
    }

    pub fn log<T: Traceable + ?Sized>(&mut self, thing: &T) {
        if let Some(text) = thing.trace_line() {
            self.record(thing.trace_phase(), text);
        }
    }

    /// Entries of one phase, oldest first
    pub fn phase(&self, phase: Phase) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |entry| entry.phase == phase)
            .map(|entry| entry.text.as_str())
    }

    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.entries
            .iter()
            .map(|entry| format!("{:06} [{}] {}", entry.seq, entry.phase, entry.text))
    }

    pub fn print(&self) {
        for line in self.lines() {
            println!("{}", line);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker(Option<&'static str>);

    impl Traceable for Marker {
        fn trace_phase(&self) -> Phase {
            Phase::Bank
        }

        fn trace_line(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    #[test]
    fn test_oldest_entries_fall_off_but_sequence_keeps_counting() {
        let mut tracer = Tracer::new(2);
        tracer.record(Phase::Boot, "a".into());
        tracer.record(Phase::Header, "b".into());
        tracer.record(Phase::Persist, "c".into());
        assert_eq!(
            tracer.lines().collect::<Vec<_>>(),
            vec!["000001 [HEADER] b", "000002 [PERSIST] c"]
        );
    }

    #[test]
    fn test_log_files_objects_under_their_phase() {
        let mut tracer = Tracer::new(8);
        tracer.record(Phase::Boot, "booted".into());
        tracer.log(&Marker(Some("lo 10/262144")));
        tracer.log(&Marker(None));

        assert_eq!(tracer.phase(Phase::Bank).collect::<Vec<_>>(), vec!["lo 10/262144"]);
        assert_eq!(tracer.phase(Phase::Boot).count(), 1);

        tracer.clear();
        assert_eq!(tracer.lines().count(), 0);
    }

    #[test]
    fn test_zero_capacity_records_nothing() {
        let mut tracer = Tracer::new(0);
        tracer.record(Phase::Boot, "x".into());
        assert_eq!(tracer.lines().count(), 0);
    }
}
