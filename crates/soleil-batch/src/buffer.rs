//! Profile buffering between computation and persistence

use soleil_core::ComputedProfile;

/// Collects computed profiles until a batch is ready to save
pub struct ProfileBuffer {
    batch_size: usize,
    profiles: Vec<ComputedProfile>,
}

impl ProfileBuffer {
    pub fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            batch_size,
            profiles: Vec::with_capacity(batch_size),
        }
    }

    /// Add a profile. Returns true once the batch is full and should be flushed.
    pub fn push(&mut self, profile: ComputedProfile) -> bool {
        self.profiles.push(profile);
        self.profiles.len() >= self.batch_size
    }

    /// Take every buffered profile
    pub fn drain(&mut self) -> Vec<ComputedProfile> {
        std::mem::replace(&mut self.profiles, Vec::with_capacity(self.batch_size))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}
