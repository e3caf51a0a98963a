/*
 * MIT License
 *
 * Copyright (c) 2022 Joseph Sacchini
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

use std::iter::FusedIterator;
use std::ops::Range;

///
/// Keeps the K highest scoring elements of an iterator without allocating or sorting the whole
/// input. Elements come back out from highest -> lowest score.
///
/// Ties keep the element that was seen first, so for an input that is already in some meaningful
/// order (like a dictionary ordered by commonness) that order survives among equal scores.
///
pub struct TopK<E, const K: usize> {
    items: [Option<E>; K],
    alive: Range<usize>,
}

impl<Element, const K: usize> TopK<Element, K> {
    pub fn new<Itr, Score, ScoringFunc>(iter: Itr, f: ScoringFunc) -> Self
    where
        Itr: Iterator<Item = Element>,
        ScoringFunc: Fn(&Element) -> Score,
        Score: PartialOrd<Score>,
    {
        // each slot holds (score, element), kept sorted greatest -> least, filled from the left
        let mut slots: [Option<(Score, Element)>; K] = std::array::from_fn(|_| None);
        let mut size = 0;

        for next in iter {
            let score = f(&next);

            // the first slot that is empty or strictly worse than us is where we belong. Using a
            // strict comparison is what keeps earlier elements ahead on ties.
            let insert_at = slots.iter().position(|slot| match slot {
                Some((other, _)) => other < &score,
                None => true,
            });

            if let Some(idx) = insert_at {
                array_insert(&mut slots, Some((score, next)), idx);
                if size < K {
                    size += 1;
                }
            }
        }

        Self {
            items: slots.map(|slot| slot.map(|(_, item)| item)),
            alive: 0..size,
        }
    }
}

impl<Element, const K: usize> Iterator for TopK<Element, K> {
    type Item = Element;

    fn next(&mut self) -> Option<Self::Item> {
        self.alive.next().and_then(|idx| self.items[idx].take())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.alive.len();
        (remaining, Some(remaining))
    }
}

impl<Element, const K: usize> ExactSizeIterator for TopK<Element, K> {}
impl<Element, const K: usize> FusedIterator for TopK<Element, K> {}

/// shifts everything at and after idx one slot to the right (dropping the last) and puts tmp at idx
#[inline]
fn array_insert<E, const N: usize>(elems: &mut [E; N], mut tmp: E, idx: usize) {
    for slot in elems.iter_mut().skip(idx) {
        std::mem::swap(&mut tmp, slot);
    }
}

pub trait TopKExt: Iterator + Sized {
    fn top_k<Score, ScoreFn, const N: usize>(self, score_f: ScoreFn) -> TopK<Self::Item, N>
    where
        ScoreFn: Fn(&Self::Item) -> Score,
        Score: PartialOrd<Score>,
    {
        TopK::new(self, score_f)
    }
}

impl<I> TopKExt for I where I: Iterator + Sized {}
