use std::num::NonZeroUsize;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip, s};
use rand::Rng;

use crate::{MlErr, Result};

/// An in-memory classification dataset: one example per feature row, one
/// class label per example.
#[derive(Clone, Debug)]
pub struct Dataset {
    x: Array2<f32>,
    y: Array1<usize>,
    classes: usize,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `x` - The feature matrix, one example per row.
    /// * `y` - The class label of each example.
    /// * `classes` - The total amount of classes labels are drawn from.
    ///
    /// # Returns
    /// The dataset, or an error when labels and features disagree in length
    /// or a label falls outside the class range.
    pub fn new(x: Array2<f32>, y: Array1<usize>, classes: usize) -> Result<Self> {
        if y.len() != x.nrows() {
            return Err(MlErr::ShapeMismatch {
                what: "labels",
                got: y.len(),
                expected: x.nrows(),
            });
        }
        if let Some(&label) = y.iter().find(|&&label| label >= classes) {
            return Err(MlErr::LabelOutOfRange { label, classes });
        }

        Ok(Self { x, y, classes })
    }

    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn num_classes(&self) -> usize {
        self.classes
    }

    /// Permutes the example rows in place, keeping feature/label pairs together.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        for i in (1..self.len()).rev() {
            let j = rng.random_range(0..=i);
            if i == j {
                continue;
            }

            let (a, b) = self.x.multi_slice_mut((s![i, ..], s![j, ..]));
            Zip::from(a).and(b).for_each(std::mem::swap);
            self.y.swap(i, j);
        }
    }
}

/// The total amount of examples a loader draws from.
///
/// May describe a prefix subset of the underlying dataset, in which case it
/// is smaller than the dataset itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sampler {
    len: usize,
}

impl Sampler {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Cuts a dataset into an ordered, restartable sequence of batches.
///
/// Every `batches` call walks the sampled examples from the start, yielding
/// feature/label view pairs in dataset order with a partial final batch when
/// the sampler length doesn't divide evenly.
#[derive(Clone, Debug)]
pub struct DataLoader<'d> {
    dataset: &'d Dataset,
    batch_size: NonZeroUsize,
    sampler: Sampler,
}

impl<'d> DataLoader<'d> {
    /// Creates a loader over the whole dataset.
    pub fn new(dataset: &'d Dataset, batch_size: NonZeroUsize) -> Self {
        Self {
            dataset,
            batch_size,
            sampler: Sampler {
                len: dataset.len(),
            },
        }
    }

    /// Creates a loader restricted to the first `len` examples.
    pub fn with_sampler_len(
        dataset: &'d Dataset,
        batch_size: NonZeroUsize,
        len: usize,
    ) -> Result<Self> {
        if len > dataset.len() {
            return Err(MlErr::ShapeMismatch {
                what: "sampler",
                got: len,
                expected: dataset.len(),
            });
        }

        Ok(Self {
            dataset,
            batch_size,
            sampler: Sampler { len },
        })
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.get()
    }

    /// Starts a fresh pass over the sampled examples.
    pub fn batches(&self) -> Batches<'d> {
        Batches {
            dataset: self.dataset,
            batch_size: self.batch_size.get(),
            end: self.sampler.len,
            cursor: 0,
        }
    }
}

/// Iterator over the `(features, labels)` batch pairs of one epoch.
pub struct Batches<'d> {
    dataset: &'d Dataset,
    batch_size: usize,
    end: usize,
    cursor: usize,
}

impl<'d> Iterator for Batches<'d> {
    type Item = (ArrayView2<'d, f32>, ArrayView1<'d, usize>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.end {
            return None;
        }

        let start = self.cursor;
        let stop = (start + self.batch_size).min(self.end);
        self.cursor = stop;

        let x = self.dataset.x.slice(s![start..stop, ..]);
        let y = self.dataset.y.slice(s![start..stop]);
        Some((x, y))
    }
}
