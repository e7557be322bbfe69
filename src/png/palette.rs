//! Palette construction for indexed-colour encoding.
//!
//! Scans the RGBA raster, assigns palette indices in first-seen order, and
//! keeps a histogram for hIST/sPLT. When transparency will be written the
//! entries are reordered so every fully-opaque entry trails the translucent
//! ones, letting tRNS drop its trailing 255s.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// A built palette plus the per-pixel index map.
#[derive(Debug)]
pub(crate) struct Palette {
    /// RGBA entries in emission order.
    pub entries: Vec<[u8; 4]>,
    /// One palette index per source pixel.
    pub indices: Vec<u8>,
    /// Pixel counts per entry, aligned with `entries`.
    pub histogram: Vec<u32>,
    /// Index of the background entry, when one was requested.
    pub background_index: Option<u8>,
}

impl Palette {
    /// Scan `raster` (RGBA bytes) and build the palette.
    ///
    /// With `keyed_on_alpha` set, pixels differing only in alpha become
    /// distinct entries and the result is ordered translucent-first;
    /// otherwise alpha is ignored and every entry is opaque. A requested
    /// `background` colour is resolved against the palette, appended when
    /// absent. More than `2^bit_depth` entries is a `PaletteOverflow`.
    pub(crate) fn build(
        raster: &[u8],
        bit_depth: u8,
        keyed_on_alpha: bool,
        background: Option<[u8; 3]>,
    ) -> Result<Palette> {
        let max_entries = 1usize << bit_depth;

        let mut lookup: HashMap<[u8; 4], usize> = HashMap::new();
        let mut entries: Vec<[u8; 4]> = Vec::new();
        let mut histogram: Vec<u32> = Vec::new();
        let mut indices: Vec<usize> = Vec::with_capacity(raster.len() / 4);

        for rgba in raster.chunks_exact(4) {
            let key = if keyed_on_alpha {
                [rgba[0], rgba[1], rgba[2], rgba[3]]
            } else {
                [rgba[0], rgba[1], rgba[2], 255]
            };
            let index = match lookup.get(&key) {
                Some(&index) => index,
                None => {
                    let index = entries.len();
                    lookup.insert(key, index);
                    entries.push(key);
                    histogram.push(0);
                    index
                }
            };
            histogram[index] += 1;
            indices.push(index);
        }

        if entries.len() > max_entries {
            return Err(Error::PaletteOverflow {
                entries: entries.len(),
                max: max_entries,
            });
        }

        // Translucent entries lead so tRNS can elide trailing 255s. The
        // sort is stable, preserving first-seen order within each class.
        if keyed_on_alpha {
            let mut order: Vec<usize> = (0..entries.len()).collect();
            order.sort_by_key(|&i| entries[i][3] == 255);

            let mut remap = vec![0usize; entries.len()];
            let mut sorted_entries = Vec::with_capacity(entries.len());
            let mut sorted_histogram = Vec::with_capacity(entries.len());
            for (new_index, &old_index) in order.iter().enumerate() {
                remap[old_index] = new_index;
                sorted_entries.push(entries[old_index]);
                sorted_histogram.push(histogram[old_index]);
            }
            entries = sorted_entries;
            histogram = sorted_histogram;
            for index in indices.iter_mut() {
                *index = remap[*index];
            }
            lookup = entries
                .iter()
                .enumerate()
                .map(|(i, &e)| (e, i))
                .collect();
        }

        let background_index = match background {
            Some([r, g, b]) => {
                let key = [r, g, b, 255];
                let index = match lookup.get(&key) {
                    Some(&index) => index,
                    None => {
                        if entries.len() >= max_entries {
                            return Err(Error::PaletteOverflow {
                                entries: entries.len() + 1,
                                max: max_entries,
                            });
                        }
                        entries.push(key);
                        histogram.push(0);
                        entries.len() - 1
                    }
                };
                Some(index as u8)
            }
            None => None,
        };

        Ok(Palette {
            entries,
            indices: indices.into_iter().map(|i| i as u8).collect(),
            histogram,
            background_index,
        })
    }

    /// PLTE payload: three bytes per entry.
    pub(crate) fn plte_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.entries.len() * 3);
        for entry in &self.entries {
            data.extend_from_slice(&entry[..3]);
        }
        data
    }

    /// tRNS payload: one alpha per entry with trailing 255s elided.
    /// Empty when every entry is opaque.
    pub(crate) fn trns_data(&self) -> Vec<u8> {
        let mut alphas: Vec<u8> = self.entries.iter().map(|e| e[3]).collect();
        while alphas.last() == Some(&255) {
            alphas.pop();
        }
        alphas
    }
}
