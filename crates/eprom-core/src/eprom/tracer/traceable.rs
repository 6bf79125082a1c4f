use super::Phase;

/// State that is worth a line in the load trace.
pub trait Traceable {
    fn trace_phase(&self) -> Phase;

    fn trace_line(&self) -> Option<String>;
}
