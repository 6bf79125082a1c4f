use super::Transport;
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

enum Event {
    Byte(u8),
    Pause,
    Error,
}

/// In-memory transport fed from a script of bytes and pauses.
///
/// A read that reaches a pause returns what it has; a read that starts on a
/// pause consumes it and returns 0, as if the timeout expired. An exhausted
/// script behaves like a sender that has gone quiet for good.
#[derive(Default)]
pub struct ScriptedTransport {
    incoming: VecDeque<Event>,
    sent: Vec<u8>,
    flushes: usize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) -> &mut Self {
        self.incoming.extend(bytes.iter().map(|&b| Event::Byte(b)));
        self
    }

    pub fn pause(&mut self) -> &mut Self {
        self.incoming.push_back(Event::Pause);
        self
    }

    /// Next read attempt fails, as on a dropped link
    pub fn fail(&mut self) -> &mut Self {
        self.incoming.push_back(Event::Error);
        self
    }

    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Bytes still queued, pauses excluded
    pub fn pending(&self) -> usize {
        self.incoming
            .iter()
            .filter(|event| matches!(event, Event::Byte(_)))
            .count()
    }
}

impl Transport for ScriptedTransport {
    fn available(&mut self) -> usize {
        self.incoming
            .iter()
            .take_while(|event| matches!(event, Event::Byte(_)))
            .count()
    }

    fn read_bytes(&mut self, buf: &mut [u8], _timeout: Duration) -> io::Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.incoming.front() {
                Some(Event::Byte(b)) => {
                    buf[n] = *b;
                    n += 1;
                    self.incoming.pop_front();
                }
                Some(Event::Pause) => {
                    if n == 0 {
                        self.incoming.pop_front();
                    }
                    break;
                }
                Some(Event::Error) => {
                    if n == 0 {
                        self.incoming.pop_front();
                        return Err(io::Error::new(
                            io::ErrorKind::BrokenPipe,
                            "scripted link failure",
                        ));
                    }
                    break;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.sent.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Duration = Duration::from_millis(10);

    #[test]
    fn test_read_stops_at_pause() {
        let mut link = ScriptedTransport::new();
        link.push(&[1, 2, 3]).pause().push(&[4]);
        assert_eq!(link.available(), 3);
        assert_eq!(link.pending(), 4);

        let mut buf = [0u8; 8];
        assert_eq!(link.read_bytes(&mut buf, T).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        // the pause itself reads as a timeout
        assert_eq!(link.read_bytes(&mut buf, T).unwrap(), 0);
        assert_eq!(link.read_bytes(&mut buf, T).unwrap(), 1);
        assert_eq!(link.read_bytes(&mut buf, T).unwrap(), 0);
        assert_eq!(link.pending(), 0);
    }

    #[test]
    fn test_read_byte() {
        let mut link = ScriptedTransport::new();
        link.push(&[0x42]);
        assert_eq!(link.read_byte(T).unwrap(), Some(0x42));
        assert_eq!(link.read_byte(T).unwrap(), None);
    }

    #[test]
    fn test_failure_surfaces_once() {
        let mut link = ScriptedTransport::new();
        link.fail().push(&[9]);
        assert!(link.read_byte(T).is_err());
        assert_eq!(link.read_byte(T).unwrap(), Some(9));
    }

    #[test]
    fn test_writes_are_captured() {
        let mut link = ScriptedTransport::new();
        link.write_byte(2).unwrap();
        link.flush().unwrap();
        assert_eq!(link.sent(), &[2]);
        assert_eq!(link.flushes(), 1);
    }
}
