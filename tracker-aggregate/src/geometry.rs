//! Geometry values and the binary geometry decoder
//!
//! Row mapping only depends on [`GeometryDecoder`]; [`WkbDecoder`] reads
//! OGC well-known binary including the PostGIS EWKB extensions (SRID and
//! Z/M flags). Only x/y are kept.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Planar coordinate pair
///
/// Equality is bitwise, so the `NaN` pair of an empty point equals itself.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_empty(&self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }
}

/// Decoded geometry
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coordinate),
    LineString(Vec<Coordinate>),
    Polygon(Vec<Vec<Coordinate>>),
    MultiPoint(Vec<Coordinate>),
    MultiLineString(Vec<Vec<Coordinate>>),
    MultiPolygon(Vec<Vec<Vec<Coordinate>>>),
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    /// GeoJSON type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::GeometryCollection(_) => "GeometryCollection",
        }
    }

    /// First coordinate of the geometry, `None` when empty
    pub fn coordinate(&self) -> Option<Coordinate> {
        let first = match self {
            Geometry::Point(c) => Some(*c),
            Geometry::LineString(cs) | Geometry::MultiPoint(cs) => cs.first().copied(),
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                rings.iter().flatten().next().copied()
            }
            Geometry::MultiPolygon(polys) => polys.iter().flatten().flatten().next().copied(),
            Geometry::GeometryCollection(members) => {
                return members.iter().find_map(Geometry::coordinate);
            }
        };
        first.filter(|c| !c.is_empty())
    }
}

struct Position<'a>(&'a Coordinate);

impl Serialize for Position<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.0.x)?;
        seq.serialize_element(&self.0.y)?;
        seq.end()
    }
}

struct Positions<'a>(&'a [Coordinate]);

impl Serialize for Positions<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(Position))
    }
}

struct Rings<'a>(&'a [Vec<Coordinate>]);

impl Serialize for Rings<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|r| Positions(r)))
    }
}

/// GeoJSON geometry object
impl Serialize for Geometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", self.type_name())?;
        match self {
            Geometry::Point(c) => map.serialize_entry("coordinates", &Position(c))?,
            Geometry::LineString(cs) | Geometry::MultiPoint(cs) => {
                map.serialize_entry("coordinates", &Positions(cs))?
            }
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                map.serialize_entry("coordinates", &Rings(rings))?
            }
            Geometry::MultiPolygon(polys) => {
                let polys: Vec<Rings<'_>> = polys.iter().map(|p| Rings(p)).collect();
                map.serialize_entry("coordinates", &polys)?
            }
            Geometry::GeometryCollection(members) => map.serialize_entry("geometries", members)?,
        }
        map.end()
    }
}

/// Why a payload could not be decoded
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("payload truncated at byte {offset}")]
    Truncated { offset: usize },

    #[error("invalid byte order marker {0:#04x}")]
    InvalidByteOrder(u8),

    #[error("unsupported geometry type code {0}")]
    UnsupportedType(u32),

    #[error("element count {count} exceeds remaining payload at byte {offset}")]
    CountTooLarge { count: u32, offset: usize },

    #[error("expected {expected} member, found {found}")]
    UnexpectedMember {
        expected: &'static str,
        found: &'static str,
    },

    #[error("geometry nesting deeper than {0} levels")]
    TooDeep(usize),

    #[error("{0} trailing bytes after geometry")]
    TrailingBytes(usize),
}

/// Turns a stored geometry payload into a [`Geometry`]
pub trait GeometryDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Geometry, GeometryError>;

    /// Lenient form: null or unparseable payloads are simply absent
    fn decode_opt(&self, bytes: Option<&[u8]>) -> Option<Geometry> {
        bytes.and_then(|b| self.decode(b).ok())
    }
}

/// Well-known binary (WKB / EWKB) decoder
#[derive(Debug, Default, Clone, Copy)]
pub struct WkbDecoder;

impl GeometryDecoder for WkbDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Geometry, GeometryError> {
        let mut reader = WkbReader { buf: bytes, pos: 0 };
        let geometry = reader.read_geometry(0)?;
        let trailing = bytes.len() - reader.pos;
        if trailing > 0 {
            return Err(GeometryError::TrailingBytes(trailing));
        }
        Ok(geometry)
    }
}

const MAX_DEPTH: usize = 16;

const EWKB_Z: u32 = 0x8000_0000;
const EWKB_M: u32 = 0x4000_0000;
const EWKB_SRID: u32 = 0x2000_0000;

#[derive(Clone, Copy)]
enum ByteOrder {
    Big,
    Little,
}

struct Header {
    order: ByteOrder,
    code: u32,
    dims: usize,
}

struct WkbReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WkbReader<'a> {
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], GeometryError> {
        let end = self.pos + N;
        let slice = self
            .buf
            .get(self.pos..end)
            .ok_or(GeometryError::Truncated { offset: self.pos })?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        self.pos = end;
        Ok(out)
    }

    fn read_u32(&mut self, order: ByteOrder) -> Result<u32, GeometryError> {
        let b = self.take::<4>()?;
        Ok(match order {
            ByteOrder::Big => u32::from_be_bytes(b),
            ByteOrder::Little => u32::from_le_bytes(b),
        })
    }

    fn read_f64(&mut self, order: ByteOrder) -> Result<f64, GeometryError> {
        let b = self.take::<8>()?;
        Ok(match order {
            ByteOrder::Big => f64::from_be_bytes(b),
            ByteOrder::Little => f64::from_le_bytes(b),
        })
    }

    /// Element count, rejected when the payload cannot possibly hold it
    fn read_count(&mut self, order: ByteOrder, min_item_len: usize) -> Result<usize, GeometryError> {
        let offset = self.pos;
        let count = self.read_u32(order)?;
        let needed = (count as usize).saturating_mul(min_item_len);
        if needed > self.remaining() {
            return Err(GeometryError::CountTooLarge { count, offset });
        }
        Ok(count as usize)
    }

    fn read_header(&mut self) -> Result<Header, GeometryError> {
        let order = match self.take::<1>()?[0] {
            0 => ByteOrder::Big,
            1 => ByteOrder::Little,
            other => return Err(GeometryError::InvalidByteOrder(other)),
        };
        let raw = self.read_u32(order)?;

        // EWKB flags live in the high bits, ISO WKB adds 1000/2000/3000
        let mut has_z = raw & EWKB_Z != 0;
        let mut has_m = raw & EWKB_M != 0;
        let base = raw & 0x0FFF_FFFF;
        match base / 1000 {
            0 => {}
            1 => has_z = true,
            2 => has_m = true,
            3 => {
                has_z = true;
                has_m = true;
            }
            _ => return Err(GeometryError::UnsupportedType(raw)),
        }
        if raw & EWKB_SRID != 0 {
            self.read_u32(order)?;
        }

        Ok(Header {
            order,
            code: base % 1000,
            dims: 2 + usize::from(has_z) + usize::from(has_m),
        })
    }

    fn read_coordinate(&mut self, order: ByteOrder, dims: usize) -> Result<Coordinate, GeometryError> {
        let x = self.read_f64(order)?;
        let y = self.read_f64(order)?;
        for _ in 2..dims {
            self.read_f64(order)?;
        }
        Ok(Coordinate::new(x, y))
    }

    fn read_coordinates(&mut self, order: ByteOrder, dims: usize) -> Result<Vec<Coordinate>, GeometryError> {
        let count = self.read_count(order, dims * 8)?;
        (0..count).map(|_| self.read_coordinate(order, dims)).collect()
    }

    fn read_rings(&mut self, order: ByteOrder, dims: usize) -> Result<Vec<Vec<Coordinate>>, GeometryError> {
        let count = self.read_count(order, 4)?;
        (0..count).map(|_| self.read_coordinates(order, dims)).collect()
    }

    fn read_members(&mut self, order: ByteOrder, depth: usize) -> Result<Vec<Geometry>, GeometryError> {
        // Smallest member: byte order + type code
        let count = self.read_count(order, 5)?;
        (0..count).map(|_| self.read_geometry(depth + 1)).collect()
    }

    fn read_geometry(&mut self, depth: usize) -> Result<Geometry, GeometryError> {
        if depth > MAX_DEPTH {
            return Err(GeometryError::TooDeep(MAX_DEPTH));
        }
        let Header { order, code, dims } = self.read_header()?;

        let geometry = match code {
            1 => Geometry::Point(self.read_coordinate(order, dims)?),
            2 => Geometry::LineString(self.read_coordinates(order, dims)?),
            3 => Geometry::Polygon(self.read_rings(order, dims)?),
            4 => Geometry::MultiPoint(
                self.read_members(order, depth)?
                    .into_iter()
                    .map(|m| match m {
                        Geometry::Point(c) => Ok(c),
                        other => Err(unexpected("Point", &other)),
                    })
                    .collect::<Result<_, _>>()?,
            ),
            5 => Geometry::MultiLineString(
                self.read_members(order, depth)?
                    .into_iter()
                    .map(|m| match m {
                        Geometry::LineString(cs) => Ok(cs),
                        other => Err(unexpected("LineString", &other)),
                    })
                    .collect::<Result<_, _>>()?,
            ),
            6 => Geometry::MultiPolygon(
                self.read_members(order, depth)?
                    .into_iter()
                    .map(|m| match m {
                        Geometry::Polygon(rings) => Ok(rings),
                        other => Err(unexpected("Polygon", &other)),
                    })
                    .collect::<Result<_, _>>()?,
            ),
            7 => Geometry::GeometryCollection(self.read_members(order, depth)?),
            other => return Err(GeometryError::UnsupportedType(other)),
        };
        Ok(geometry)
    }
}

fn unexpected(expected: &'static str, found: &Geometry) -> GeometryError {
    GeometryError::UnexpectedMember {
        expected,
        found: found.type_name(),
    }
}
