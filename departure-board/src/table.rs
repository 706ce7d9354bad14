//! Table synchronisation.
//!
//! Result tables are replaced wholesale on every successful query. Widgets
//! backing these tables want to hear about each row individually, so
//! [`sync`] performs the replacement one row at a time and reports every
//! step to a [`TableObserver`].
//!
//! Overlapping requests for the same table are ordered with a
//! [`Generation`] token: only the response to the most recent request may
//! touch the rows.

/// Receives per-row change notifications.
pub trait TableObserver {
    /// The row at `index` was removed.
    fn row_removed(&mut self, index: usize);

    /// A row was inserted at `index`.
    fn row_inserted(&mut self, index: usize);
}

/// `(on_remove, on_insert)` callback pairs.
impl<R, I> TableObserver for (R, I)
where
    R: FnMut(usize),
    I: FnMut(usize),
{
    fn row_removed(&mut self, index: usize) {
        (self.0)(index)
    }

    fn row_inserted(&mut self, index: usize) {
        (self.1)(index)
    }
}

/// Replace the contents of `target` with `fresh`.
///
/// Every existing row is removed from the front, reporting index 0 each
/// time, then each fresh row is appended in order and its index reported.
/// Afterwards `target` holds exactly `fresh`, and the observer has seen one
/// notification per mutation.
///
/// # Examples
///
/// ```
/// use departure_board::table::sync;
///
/// let mut rows = vec!["a", "b"];
/// let mut removed = Vec::new();
/// let mut inserted = Vec::new();
///
/// sync(
///     &mut rows,
///     vec!["x", "y", "z"],
///     &mut (|i: usize| removed.push(i), |i: usize| inserted.push(i)),
/// );
///
/// assert_eq!(rows, ["x", "y", "z"]);
/// assert_eq!(removed, [0, 0]);
/// assert_eq!(inserted, [0, 1, 2]);
/// ```
pub fn sync<T>(
    target: &mut Vec<T>,
    fresh: impl IntoIterator<Item = T>,
    observer: &mut impl TableObserver,
) {
    while !target.is_empty() {
        target.remove(0);
        observer.row_removed(0);
    }
    target.clear();

    for row in fresh {
        let index = target.len();
        target.push(row);
        observer.row_inserted(index);
    }
}

/// Identifies one request against a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Rows of one result table plus its request bookkeeping.
#[derive(Debug, Clone)]
pub struct Table<T> {
    rows: Vec<T>,
    latest: Generation,
    loading: bool,
}

impl<T> Table<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            latest: Generation(0),
            loading: false,
        }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Start a new request, superseding any outstanding one.
    pub fn begin_request(&mut self) -> Generation {
        self.latest = Generation(self.latest.0 + 1);
        self.loading = true;
        self.latest
    }

    /// Accept the response to `generation`.
    ///
    /// Returns `false` for a superseded request, whose response must be
    /// discarded. Accepting the latest request ends the loading state.
    pub fn settle(&mut self, generation: Generation) -> bool {
        if generation != self.latest || !self.loading {
            return false;
        }
        self.loading = false;
        true
    }

    /// Replace all rows, notifying `observer` of every mutation.
    pub fn replace(
        &mut self,
        fresh: impl IntoIterator<Item = T>,
        observer: &mut impl TableObserver,
    ) {
        sync(&mut self.rows, fresh, observer);
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records notifications in order.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct Recorder {
        events: Vec<(char, usize)>,
    }

    impl TableObserver for Recorder {
        fn row_removed(&mut self, index: usize) {
            self.events.push(('-', index));
        }

        fn row_inserted(&mut self, index: usize) {
            self.events.push(('+', index));
        }
    }

    #[test]
    fn sync_into_empty() {
        let mut target = Vec::new();
        let mut recorder = Recorder::default();

        sync(&mut target, vec![1, 2], &mut recorder);

        assert_eq!(target, vec![1, 2]);
        assert_eq!(recorder.events, vec![('+', 0), ('+', 1)]);
    }

    #[test]
    fn sync_to_empty() {
        let mut target = vec![1, 2, 3];
        let mut recorder = Recorder::default();

        sync(&mut target, Vec::new(), &mut recorder);

        assert!(target.is_empty());
        assert_eq!(recorder.events, vec![('-', 0), ('-', 0), ('-', 0)]);
    }

    #[test]
    fn removals_precede_insertions() {
        let mut target = vec!['a'];
        let mut recorder = Recorder::default();

        sync(&mut target, vec!['b', 'c'], &mut recorder);

        assert_eq!(recorder.events, vec![('-', 0), ('+', 0), ('+', 1)]);
    }

    #[test]
    fn generations_increase() {
        let mut table: Table<u8> = Table::new();
        let first = table.begin_request();
        let second = table.begin_request();

        assert!(second > first);
        assert_eq!(second.value(), first.value() + 1);
    }

    #[test]
    fn stale_generation_is_rejected() {
        let mut table: Table<u8> = Table::new();
        let first = table.begin_request();
        let second = table.begin_request();

        assert!(!table.settle(first));
        assert!(table.is_loading());
        assert!(table.settle(second));
        assert!(!table.is_loading());
    }

    #[test]
    fn generation_settles_once() {
        let mut table: Table<u8> = Table::new();
        let generation = table.begin_request();

        assert!(table.settle(generation));
        assert!(!table.settle(generation));
    }

    #[test]
    fn replace_goes_through_sync() {
        let mut table = Table::new();
        let mut recorder = Recorder::default();
        table.replace(vec!["x"], &mut recorder);
        table.replace(vec!["y", "z"], &mut recorder);

        assert_eq!(table.rows(), ["y", "z"]);
        assert_eq!(
            recorder.events,
            vec![('+', 0), ('-', 0), ('+', 0), ('+', 1)]
        );
    }
}
