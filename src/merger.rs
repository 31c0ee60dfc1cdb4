//! Pairwise runs merger.

use std::path::Path;

use crate::run::Run;
use crate::tape::{Tape, TapeDelays, TapeError};

/// Pairwise merger implementation.
/// Reduces sorted runs to a single one by merging adjacent pairs level by level.
/// Takes ⌈log2(*n*)⌉ passes over the data where *n* is the number of runs, but keeps only
/// three tapes (two inputs and one output) open at a time.
pub struct PairwiseMerger<'a> {
    /// Directory to create merged runs in.
    dir: &'a Path,
    /// Operation delays of merged runs.
    delays: TapeDelays,
}

impl<'a> PairwiseMerger<'a> {
    /// Creates a merger storing intermediate runs in `dir`.
    pub fn new(dir: &'a Path, delays: TapeDelays) -> Self {
        PairwiseMerger { dir, delays }
    }

    /// Merges `runs` and writes the result to `output`. Runs should be sorted in ascending order
    /// otherwise the result is undefined. Nothing is written if there are no runs.
    ///
    /// # Arguments
    /// * `runs` - Runs to be merged in a single sorted one
    /// * `output` - Tape the merged data is copied to
    pub fn merge<O>(&self, runs: Vec<Run>, output: &mut O) -> Result<(), TapeError>
    where
        O: Tape + ?Sized,
    {
        if let Some(mut run) = self.reduce(runs)? {
            log::debug!("copying {} elements to the output", run.size());
            copy(&mut run, output)?;
        }

        return Ok(());
    }

    /// Reduces `runs` to a single run. Merged runs are removed as soon as they are consumed.
    pub fn reduce(&self, mut runs: Vec<Run>) -> Result<Option<Run>, TapeError> {
        let mut level = 0;

        while runs.len() > 1 {
            log::debug!("merge level {}: {} runs", level, runs.len());
            let mut merged = Vec::with_capacity((runs.len() + 1) / 2);
            let mut current = runs.into_iter();

            while let Some(mut left) = current.next() {
                let mut right = match current.next() {
                    Some(right) => right,
                    None => {
                        merged.push(left);
                        break;
                    }
                };

                let name = format!("merge_{}_{}.bin", level, merged.len());
                let mut out = Run::create(self.dir, &name, left.size() + right.size(), self.delays)?;
                merge_two(&mut left, &mut right, &mut out)?;
                merged.push(out);
            }

            runs = merged;
            level += 1;
        }

        return Ok(runs.pop());
    }
}

/// Merges two sorted tapes into `out`. On equal values the value from `left` goes first.
pub fn merge_two<L, R, O>(left: &mut L, right: &mut R, out: &mut O) -> Result<(), TapeError>
where
    L: Tape + ?Sized,
    R: Tape + ?Sized,
    O: Tape + ?Sized,
{
    left.rewind()?;
    right.rewind()?;
    out.rewind()?;

    let mut left_value = head_value(left)?;
    let mut right_value = head_value(right)?;

    while let (Some(l), Some(r)) = (left_value, right_value) {
        if l <= r {
            out.write(l)?;
            left_value = advance(left)?;
        } else {
            out.write(r)?;
            right_value = advance(right)?;
        }
        out.move_right()?;
    }

    while let Some(l) = left_value {
        out.write(l)?;
        out.move_right()?;
        left_value = advance(left)?;
    }

    while let Some(r) = right_value {
        out.write(r)?;
        out.move_right()?;
        right_value = advance(right)?;
    }

    return Ok(());
}

/// Copies `input` from the beginning to `output` from the beginning.
pub fn copy<I, O>(input: &mut I, output: &mut O) -> Result<(), TapeError>
where
    I: Tape + ?Sized,
    O: Tape + ?Sized,
{
    input.rewind()?;
    output.rewind()?;

    while !input.is_at_end() {
        output.write(input.read()?)?;
        output.move_right()?;
        input.move_right()?;
    }

    return Ok(());
}

fn head_value<T: Tape + ?Sized>(tape: &mut T) -> Result<Option<i32>, TapeError> {
    if tape.is_at_end() {
        Ok(None)
    } else {
        tape.read().map(Some)
    }
}

fn advance<T: Tape + ?Sized>(tape: &mut T) -> Result<Option<i32>, TapeError> {
    tape.move_right()?;
    head_value(tape)
}
