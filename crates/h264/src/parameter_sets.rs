use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{Error, Pps, Result, Sps};

/// The most recently seen parameter sets of a stream, indexed by id.
///
/// SPS ids range over \[0, 31\] and PPS ids over \[0, 255\]. Inserting a set
/// replaces any previous set with the same id.
#[derive(Debug, Clone, Default)]
pub struct ParameterSets {
    sps: FxHashMap<u8, Sps>,
    pps: FxHashMap<u8, Pps>,
}

impl ParameterSets {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the SPS at its `seq_parameter_set_id`, returning the replaced set.
    pub fn insert_sps(&mut self, sps: Sps) -> Result<Option<Sps>> {
        let id = sps.seq_parameter_set_id;
        if id > 31 {
            return Err(Error::InvalidData(format!(
                "seq_parameter_set_id is out of range [0, 31]: {id}"
            )));
        }

        debug!(sps_id = id, profile_idc = sps.profile_idc, level_idc = sps.level_idc, "storing sps");
        Ok(self.sps.insert(id, sps))
    }

    /// Inserts or replaces the PPS at its `pic_parameter_set_id`, returning the replaced set.
    pub fn insert_pps(&mut self, pps: Pps) -> Option<Pps> {
        debug!(pps_id = pps.pic_parameter_set_id, sps_id = pps.seq_parameter_set_id, "storing pps");
        self.pps.insert(pps.pic_parameter_set_id, pps)
    }

    /// Returns the SPS with the given id.
    pub fn sps(&self, id: u8) -> Option<&Sps> {
        self.sps.get(&id)
    }

    /// Returns the PPS with the given id.
    pub fn pps(&self, id: u8) -> Option<&Pps> {
        self.pps.get(&id)
    }

    /// Looks up a PPS and the SPS it refers to, as a slice header does.
    pub fn resolve(&self, pps_id: u8) -> Result<(&Pps, &Sps)> {
        let pps = self.pps(pps_id).ok_or(Error::MissingPps(pps_id as u32))?;
        let sps = self
            .sps(pps.seq_parameter_set_id)
            .ok_or(Error::MissingSps(pps.seq_parameter_set_id as u32))?;

        Ok((pps, sps))
    }

    /// Number of stored sequence parameter sets.
    pub fn sps_count(&self) -> usize {
        self.sps.len()
    }

    /// Number of stored picture parameter sets.
    pub fn pps_count(&self) -> usize {
        self.pps.len()
    }

    /// Drops every stored parameter set.
    pub fn clear(&mut self) {
        self.sps.clear();
        self.pps.clear();
    }
}
