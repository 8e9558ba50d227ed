use std::io;

use bytes_util::{BitReader, BitWriter, range_check};
use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};

/// The slice group (FMO) part of a PPS, present when `num_slice_groups_minus1 > 0`.
///
/// ISO/IEC-14496-10-2022 - 7.3.2.2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceGroups {
    /// `num_slice_groups_minus1`, in \[1, 7\] when slice groups are present.
    pub num_slice_groups_minus1: u8,

    /// The map selected by `slice_group_map_type`.
    pub map: SliceGroupMap,
}

/// The slice group map units to slice group assignment, by `slice_group_map_type`.
///
/// ISO/IEC-14496-10-2022 - 7.4.2.2
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliceGroupMap {
    /// Type 0: interleaved slice groups.
    Interleaved {
        /// `run_length_minus1[iGroup]`, one per slice group.
        run_length_minus1: Vec<u32>,
    },
    /// Type 1: dispersed slice group mapping.
    Dispersed,
    /// Type 2: foreground slice groups with a left-over background.
    Foreground {
        /// `top_left[iGroup]`, one per slice group except the last.
        top_left: Vec<u32>,
        /// `bottom_right[iGroup]`, one per slice group except the last.
        bottom_right: Vec<u32>,
    },
    /// Types 3 to 5: changing slice groups (box-out, raster scan, wipe).
    Changing {
        /// `slice_group_map_type`, in \[3, 5\].
        slice_group_map_type: u8,
        /// `slice_group_change_direction_flag`
        slice_group_change_direction_flag: bool,
        /// `slice_group_change_rate_minus1`, in \[0, PicSizeInMapUnits - 1\].
        slice_group_change_rate_minus1: u32,
    },
    /// Type 6: explicit assignment of every slice group map unit.
    Explicit {
        /// `slice_group_id[i]`, `pic_size_in_map_units_minus1 + 1` entries.
        slice_group_id: Vec<u8>,
    },
}

impl SliceGroupMap {
    /// The `slice_group_map_type` that selects this variant.
    pub const fn slice_group_map_type(&self) -> u8 {
        match self {
            Self::Interleaved { .. } => 0,
            Self::Dispersed => 1,
            Self::Foreground { .. } => 2,
            Self::Changing {
                slice_group_map_type, ..
            } => *slice_group_map_type,
            Self::Explicit { .. } => 6,
        }
    }
}

/// `pic_size_in_map_units_minus1` must be below this, the largest frame of any level.
const MAX_PIC_SIZE_IN_MAP_UNITS: u64 = 139264;

impl SliceGroups {
    /// `SliceGroupChangeRate`, present for map types 3 to 5.
    pub fn slice_group_change_rate(&self) -> Option<u32> {
        match self.map {
            SliceGroupMap::Changing {
                slice_group_change_rate_minus1,
                ..
            } => Some(slice_group_change_rate_minus1.saturating_add(1)),
            _ => None,
        }
    }

    /// The bytes taken by an explicit `slice_group_id` map, zero for the other map types.
    pub(crate) fn explicit_map_len(&self) -> usize {
        match &self.map {
            SliceGroupMap::Explicit { slice_group_id } => {
                (slice_group_id.len() * slice_group_id_bits(self.num_slice_groups_minus1) as usize).div_ceil(8)
            }
            _ => 0,
        }
    }

    /// Parses the fields following `num_slice_groups_minus1`.
    pub fn parse(reader: &mut BitReader, num_slice_groups_minus1: u8) -> io::Result<Self> {
        let slice_group_map_type = reader.read_exp_golomb()?;
        range_check!(slice_group_map_type, 0, 6)?;

        let map = match slice_group_map_type {
            0 => SliceGroupMap::Interleaved {
                run_length_minus1: (0..=num_slice_groups_minus1)
                    .map(|_| read_u32(reader))
                    .collect::<io::Result<_>>()?,
            },
            1 => SliceGroupMap::Dispersed,
            2 => {
                let mut top_left = Vec::with_capacity(num_slice_groups_minus1 as usize);
                let mut bottom_right = Vec::with_capacity(num_slice_groups_minus1 as usize);
                for _ in 0..num_slice_groups_minus1 {
                    top_left.push(read_u32(reader)?);
                    bottom_right.push(read_u32(reader)?);
                }
                SliceGroupMap::Foreground { top_left, bottom_right }
            }
            3..=5 => SliceGroupMap::Changing {
                slice_group_map_type: slice_group_map_type as u8,
                slice_group_change_direction_flag: reader.read_bit()?,
                slice_group_change_rate_minus1: read_u32(reader)?,
            },
            _ => {
                let pic_size_in_map_units_minus1 = reader.read_exp_golomb()?;
                range_check!(pic_size_in_map_units_minus1, 0, MAX_PIC_SIZE_IN_MAP_UNITS - 1)?;

                let bits = slice_group_id_bits(num_slice_groups_minus1);
                let slice_group_id = (0..=pic_size_in_map_units_minus1)
                    .map(|_| -> io::Result<u8> { Ok(reader.read_bits(bits)? as u8) })
                    .collect::<io::Result<_>>()?;

                SliceGroupMap::Explicit { slice_group_id }
            }
        };

        Ok(Self {
            num_slice_groups_minus1,
            map,
        })
    }

    /// Builds the fields following `num_slice_groups_minus1`.
    pub fn build(&self, writer: &mut BitWriter) -> io::Result<()> {
        let groups = self.num_slice_groups_minus1 as usize;
        writer.write_exp_golomb(self.map.slice_group_map_type() as u64)?;

        match &self.map {
            SliceGroupMap::Interleaved { run_length_minus1 } => {
                range_check!(run_length_minus1.len(), groups + 1, groups + 1)?;
                for run_length in run_length_minus1 {
                    writer.write_exp_golomb(*run_length as u64)?;
                }
            }
            SliceGroupMap::Dispersed => {}
            SliceGroupMap::Foreground { top_left, bottom_right } => {
                range_check!(top_left.len(), groups, groups)?;
                range_check!(bottom_right.len(), groups, groups)?;
                for (top_left, bottom_right) in top_left.iter().zip(bottom_right) {
                    writer.write_exp_golomb(*top_left as u64)?;
                    writer.write_exp_golomb(*bottom_right as u64)?;
                }
            }
            SliceGroupMap::Changing {
                slice_group_map_type,
                slice_group_change_direction_flag,
                slice_group_change_rate_minus1,
            } => {
                range_check!(*slice_group_map_type, 3, 5)?;
                writer.write_bit(*slice_group_change_direction_flag)?;
                writer.write_exp_golomb(*slice_group_change_rate_minus1 as u64)?;
            }
            SliceGroupMap::Explicit { slice_group_id } => {
                range_check!(slice_group_id.len() as u64, 1, MAX_PIC_SIZE_IN_MAP_UNITS)?;
                writer.write_exp_golomb(slice_group_id.len() as u64 - 1)?;

                let bits = slice_group_id_bits(self.num_slice_groups_minus1);
                for id in slice_group_id {
                    writer.write_bits(*id as u64, bits)?;
                }
            }
        }

        Ok(())
    }
}

/// `Ceil(Log2(num_slice_groups_minus1 + 1))`
fn slice_group_id_bits(num_slice_groups_minus1: u8) -> u8 {
    (u8::BITS - num_slice_groups_minus1.leading_zeros()) as u8
}

fn read_u32(reader: &mut BitReader) -> io::Result<u32> {
    let value = reader.read_exp_golomb()?;
    range_check!(value, 0, u32::MAX as u64)?;
    Ok(value as u32)
}
