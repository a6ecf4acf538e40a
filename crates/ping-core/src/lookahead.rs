//! Single-pass cursor with one element of lookahead.
//!
//! [`Lookahead`] wraps any iterator and adds [`peek`](Lookahead::peek) so a
//! consumer can decide whether the next element still belongs to it before
//! consuming it. The windowed aggregator relies on this to cut a
//! time-descending sample stream into hours without re-scanning.
//!
//! # Shared cursor
//!
//! The composing views ([`skip_view`](Lookahead::skip_view),
//! [`take_view`](Lookahead::take_view), [`filter_view`](Lookahead::filter_view),
//! [`map_view`](Lookahead::map_view)) borrow the cursor mutably and return a
//! new `Lookahead` over it. Pulling from the view advances the original
//! cursor; once the view is dropped the original continues from wherever the
//! view stopped. The views are named apart from the by-value [`Iterator`]
//! adapters so that calling one on an owned cursor still borrows it.
//!
//! # Window boundaries
//!
//! Two take views exist:
//!
//! - [`take_view`](Lookahead::take_view) peeks before consuming, so the
//!   element that ends the run stays in the cursor for the next consumer.
//! - [`take_view_discarding`](Lookahead::take_view_discarding) consumes the
//!   element while testing it, like [`Iterator::take_while`]. That element is
//!   lost to every later consumer of the shared cursor.
//!
//! None of the operations fail. Exhaustion is reported as `None`, and a
//! cursor never rewinds.

use std::iter::{Filter, Map, SkipWhile};

/// Peekable, composable, single-pass cursor.
pub struct Lookahead<I: Iterator> {
    iter: I,
    /// `Some(None)` records that the source already reported exhaustion.
    peeked: Option<Option<I::Item>>,
}

impl<I: Iterator> Lookahead<I> {
    /// Wrap `iter`. Nothing is pulled until the first `peek` or `advance`.
    pub fn new(iter: I) -> Self {
        Self { iter, peeked: None }
    }

    /// The next element, without consuming it. Repeated calls return the same
    /// element and pull from the source at most once.
    pub fn peek(&mut self) -> Option<&I::Item> {
        let iter = &mut self.iter;
        self.peeked.get_or_insert_with(|| iter.next()).as_ref()
    }

    /// Consume and return the next element.
    pub fn advance(&mut self) -> Option<I::Item> {
        match self.peeked.take() {
            Some(Some(item)) => Some(item),
            Some(None) => {
                self.peeked = Some(None);
                None
            }
            None => {
                let item = self.iter.next();
                if item.is_none() {
                    self.peeked = Some(None);
                }
                item
            }
        }
    }

    /// Consume the next element only if it satisfies `pred`.
    pub fn advance_if(&mut self, pred: impl FnOnce(&I::Item) -> bool) -> Option<I::Item> {
        if self.peek().is_some_and(pred) { self.advance() } else { None }
    }

    pub fn is_exhausted(&mut self) -> bool {
        self.peek().is_none()
    }

    /// Drop the longest prefix satisfying `pred`. The first element that fails
    /// `pred` is yielded, followed by the rest of the cursor.
    pub fn skip_view<P>(&mut self, pred: P) -> Lookahead<SkipWhile<&mut Self, P>>
    where
        P: FnMut(&I::Item) -> bool,
    {
        Lookahead::new(Iterator::skip_while(self, pred))
    }

    /// Yield elements while `pred` holds. The first element that fails `pred`
    /// is left in this cursor.
    pub fn take_view<P>(&mut self, pred: P) -> Lookahead<TakeWhile<'_, I, P>>
    where
        P: FnMut(&I::Item) -> bool,
    {
        Lookahead::new(TakeWhile { cursor: self, pred, done: false })
    }

    /// Yield elements while `pred` holds. The first element that fails `pred`
    /// is consumed and dropped.
    pub fn take_view_discarding<P>(
        &mut self,
        pred: P,
    ) -> Lookahead<std::iter::TakeWhile<&mut Self, P>>
    where
        P: FnMut(&I::Item) -> bool,
    {
        Lookahead::new(Iterator::take_while(self, pred))
    }

    pub fn filter_view<P>(&mut self, pred: P) -> Lookahead<Filter<&mut Self, P>>
    where
        P: FnMut(&I::Item) -> bool,
    {
        Lookahead::new(Iterator::filter(self, pred))
    }

    pub fn map_view<B, F>(&mut self, f: F) -> Lookahead<Map<&mut Self, F>>
    where
        F: FnMut(I::Item) -> B,
    {
        Lookahead::new(Iterator::map(self, f))
    }
}

impl<I: Iterator> Iterator for Lookahead<I> {
    type Item = I::Item;

    #[inline]
    fn next(&mut self) -> Option<I::Item> {
        self.advance()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let peeked = match self.peeked {
            Some(None) => return (0, Some(0)),
            Some(Some(_)) => 1,
            None => 0,
        };
        let (lo, hi) = self.iter.size_hint();
        (lo.saturating_add(peeked), hi.and_then(|h| h.checked_add(peeked)))
    }
}

/// View returned by [`Lookahead::take_view`].
pub struct TakeWhile<'a, I: Iterator, P> {
    cursor: &'a mut Lookahead<I>,
    pred: P,
    done: bool,
}

impl<I, P> Iterator for TakeWhile<'_, I, P>
where
    I: Iterator,
    P: FnMut(&I::Item) -> bool,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        if self.done {
            return None;
        }
        let item = self.cursor.advance_if(&mut self.pred);
        if item.is_none() {
            self.done = true;
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done { (0, Some(0)) } else { (0, self.cursor.size_hint().1) }
    }
}

/// Wrap anything iterable in a [`Lookahead`].
pub fn lookahead<I: IntoIterator>(iter: I) -> Lookahead<I::IntoIter> {
    Lookahead::new(iter.into_iter())
}
