// {{{ Copyright (c) Paul R. Tagliamonte <paultag@debian.org>, 2024
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE. }}}

//! The `cleanup` module provides the two scoped-guard flavors used to
//! keep on-disk state consistent on every exit path.
//!
//! Scoped resource acquisitions (an open temp file, a half-written
//! sibling, a lock) register a guard; guards run in reverse order of
//! creation. [Always] runs unconditionally when its scope ends.
//! [OnError] runs unless it has been [OnError::defuse]d, which the happy
//! path does right before committing -- so the handler only fires when
//! the scope is left early by a `?` or a panic.

/// Guard that runs its handler on every exit from the scope.
pub struct Always<F: FnMut()> {
    handler: F,
}

impl<F: FnMut()> Always<F> {
    /// Register a handler to run when the scope ends, however it ends.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F: FnMut()> Drop for Always<F> {
    fn drop(&mut self) {
        run_shielded(&mut self.handler);
    }
}

/// Guard that runs its handler only if the scope is left without
/// calling [OnError::defuse] -- early returns and panics, not the
/// committed path.
pub struct OnError<F: FnMut()> {
    handler: F,
    armed: bool,
}

impl<F: FnMut()> OnError<F> {
    /// Register a handler to run on the error path.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            armed: true,
        }
    }

    /// Mark the scope as having completed; the handler will not run.
    pub fn defuse(mut self) {
        self.armed = false;
    }
}

impl<F: FnMut()> Drop for OnError<F> {
    fn drop(&mut self) {
        if self.armed {
            run_shielded(&mut self.handler);
        }
    }
}

// A handler that panics while we are already unwinding would abort the
// process before outer guards get to run; catching here guarantees the
// rest of the stack still makes progress.
fn run_shielded<F: FnMut()>(handler: &mut F) {
    let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(handler));
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn always_runs_on_success() {
        let ran = Cell::new(false);
        {
            let _guard = Always::new(|| ran.set(true));
        }
        assert!(ran.get());
    }

    #[test]
    fn on_error_skipped_when_defused() {
        let ran = Cell::new(false);
        {
            let guard = OnError::new(|| ran.set(true));
            guard.defuse();
        }
        assert!(!ran.get());
    }

    #[test]
    fn on_error_runs_when_dropped_armed() {
        let ran = Cell::new(false);
        {
            let _guard = OnError::new(|| ran.set(true));
        }
        assert!(ran.get());
    }

    #[test]
    fn on_error_runs_on_unwind() {
        let ran = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let saw = ran.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = OnError::new(|| saw.store(true, std::sync::atomic::Ordering::SeqCst));
            panic!("boom");
        });
        assert!(result.is_err());
        assert!(ran.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn guards_unwind_in_reverse_order() {
        let order = std::cell::RefCell::new(vec![]);
        {
            let _first = Always::new(|| order.borrow_mut().push(1));
            let _second = Always::new(|| order.borrow_mut().push(2));
        }
        assert_eq!(vec![2, 1], *order.borrow());
    }
}

// vim: foldmethod=marker
