//! Exit-time counter report.

use std::collections::BTreeMap;
use std::io::{self, Write};

/// First line of the report.
pub const REPORT_HEADER: &str = "libcall counts:";

/// Write the counter table, names left-aligned to the longest name.
pub fn write_report<W: Write>(out: &mut W, counts: &BTreeMap<String, u64>) -> io::Result<()> {
    let width = counts.keys().map(|name| name.chars().count()).max().unwrap_or(0);
    writeln!(out, "{REPORT_HEADER}")?;
    for (name, count) in counts {
        writeln!(out, "  {name:<width$} : {count}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CounterStore;

    fn render(store: &CounterStore) -> String {
        let mut out = Vec::new();
        write_report(&mut out, &store.snapshot()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_report_lines() {
        let store = CounterStore::new();
        for _ in 0..3 {
            store.record("foo");
        }
        store.record("bar");
        assert_eq!(render(&store), "libcall counts:\n  bar : 1\n  foo : 3\n");
    }

    #[test]
    fn test_report_pads_to_longest_name() {
        let store = CounterStore::new();
        store.record("malloc");
        store.record("free");
        store.record("free");
        assert_eq!(
            render(&store),
            "libcall counts:\n  free   : 2\n  malloc : 1\n"
        );
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(render(&CounterStore::new()), "libcall counts:\n");
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn test_write_errors_are_returned() {
        let store = CounterStore::new();
        store.record("x");
        assert!(write_report(&mut Broken, &store.snapshot()).is_err());
    }
}
