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

// The verrevcmp algorithm of deb-version(5): alternating non-digit and
// digit runs, `~` sorting before end-of-string, end-of-string before
// everything else, letters before non-letters.

use super::Version;
use std::cmp::Ordering;

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.epoch().cmp(&other.epoch()) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match verrevcmp(self.upstream(), other.upstream()) {
            Ordering::Equal => {}
            ord => return ord,
        }

        verrevcmp(
            self.revision().unwrap_or(""),
            other.revision().unwrap_or(""),
        )
    }
}

// Weight of one character. End-of-string weighs 0, so `~` (the only
// negative weight) sorts before it, and every other character after it;
// letters keep their ASCII value while punctuation is pushed past the
// letter range.
fn order(ch: Option<u8>) -> i32 {
    match ch {
        None => 0,
        Some(b'~') => -1,
        Some(ch) if ch.is_ascii_digit() => 0,
        Some(ch) if ch.is_ascii_alphabetic() => ch as i32,
        Some(ch) => ch as i32 + 256,
    }
}

fn is_digit(ch: Option<u8>) -> bool {
    matches!(ch, Some(ch) if ch.is_ascii_digit())
}

pub(super) fn verrevcmp(left: &str, right: &str) -> Ordering {
    let left = left.as_bytes();
    let right = right.as_bytes();
    let mut l = 0;
    let mut r = 0;

    while l < left.len() || r < right.len() {
        // Non-digit run, character by character. End-of-string takes
        // part in the comparison with weight 0.
        while (l < left.len() && !is_digit(left.get(l).copied()))
            || (r < right.len() && !is_digit(right.get(r).copied()))
        {
            let lw = order(left.get(l).copied());
            let rw = order(right.get(r).copied());
            if lw != rw {
                return lw.cmp(&rw);
            }
            l += 1;
            r += 1;
        }

        // Digit run: strip leading zeros, then longer run wins, ties
        // break on the first differing digit.
        while left.get(l) == Some(&b'0') {
            l += 1;
        }
        while right.get(r) == Some(&b'0') {
            r += 1;
        }

        let mut first_diff = Ordering::Equal;
        while is_digit(left.get(l).copied()) && is_digit(right.get(r).copied()) {
            if first_diff == Ordering::Equal {
                first_diff = left[l].cmp(&right[r]);
            }
            l += 1;
            r += 1;
        }
        if is_digit(left.get(l).copied()) {
            return Ordering::Greater;
        }
        if is_digit(right.get(r).copied()) {
            return Ordering::Less;
        }
        if first_diff != Ordering::Equal {
            return first_diff;
        }
    }

    Ordering::Equal
}


// vim: foldmethod=marker
