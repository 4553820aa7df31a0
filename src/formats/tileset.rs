use super::stb::StructuredTable;
use crate::error::DecodeError;

const CHAIN_COLUMN: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileRange {
    pub number: i32,
    pub count: i32,
}

impl TileRange {
    pub fn contains(&self, tile: i32) -> bool {
        tile >= self.number && tile < self.number + self.count
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Brush {
    pub label: String,
    pub min_brush: i32,
    pub max_brush: i32,
    pub tiles: [TileRange; 3],
    pub direction: i32,
}

/// Brush descriptors plus the square matrix saying which brushes blend into which.
#[derive(Debug, Clone, Default)]
pub struct TileSet {
    pub brushes: Vec<Brush>,
    chains: Vec<u8>,
}

impl TileSet {
    pub fn from_table(table: &StructuredTable) -> Result<Self, DecodeError> {
        let count = table.row_count();
        let mut brushes = Vec::with_capacity(count);
        let mut chains = Vec::with_capacity(count * count);
        for row in 0..count {
            let mut tiles = [TileRange::default(); 3];
            for (variant, range) in tiles.iter_mut().enumerate() {
                range.number = table.int(row, 3 + variant * 2)?;
                range.count = table.int(row, 4 + variant * 2)?;
            }
            brushes.push(Brush {
                label: table.string(row, 0)?,
                min_brush: table.int(row, 1)?,
                max_brush: table.int(row, 2)?,
                tiles,
                direction: table.int(row, 9)?,
            });
            for column in 0..count {
                chains.push(table.byte(row, CHAIN_COLUMN + column)?);
            }
        }
        Ok(Self { brushes, chains })
    }

    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    pub fn chain(&self, from: usize, to: usize) -> Option<u8> {
        let count = self.brushes.len();
        if from >= count || to >= count {
            return None;
        }
        Some(self.chains[from * count + to])
    }

    pub fn brush_for_tile(&self, tile: i32) -> Option<usize> {
        self.brushes.iter().position(|brush| brush.tiles.iter().any(|range| range.contains(tile)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::reader::TextEncoding;
    use crate::formats::stb;

    #[test]
    fn brushes_and_chain_matrix() {
        let text = "label\tmin\tmax\tn0\tc0\tn1\tc1\tn2\tc2\tdir\tb0\tb1\n\
                    grass\t1\t4\t0\t8\t8\t4\t12\t4\t0\t1\t1\n\
                    dirt\t5\t9\t16\t8\t24\t4\t28\t4\t2\t0\t1\n";
        let table = stb::decode(text.as_bytes(), TextEncoding::default()).unwrap();
        let tiles = TileSet::from_table(&table).unwrap();
        assert_eq!(tiles.brush_count(), 2);
        assert_eq!(tiles.brushes[1].label, "dirt");
        assert_eq!(tiles.brushes[1].tiles[1], TileRange { number: 24, count: 4 });
        assert_eq!(tiles.brushes[1].direction, 2);
        assert_eq!(tiles.chain(0, 1), Some(1));
        assert_eq!(tiles.chain(1, 0), Some(0));
        assert_eq!(tiles.chain(2, 0), None);
        assert_eq!(tiles.brush_for_tile(13), Some(0));
        assert_eq!(tiles.brush_for_tile(30), Some(1));
        assert_eq!(tiles.brush_for_tile(99), None);
    }

    #[test]
    fn missing_chain_column_is_out_of_range() {
        let text = "label\tmin\tmax\tn0\tc0\tn1\tc1\tn2\tc2\tdir\n\
                    grass\t1\t4\t0\t8\t8\t4\t12\t4\t0\n";
        let table = stb::decode(text.as_bytes(), TextEncoding::default()).unwrap();
        assert!(matches!(TileSet::from_table(&table), Err(DecodeError::CellOutOfRange { .. })));
    }
}
