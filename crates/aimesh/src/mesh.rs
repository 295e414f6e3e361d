// mesh.rs - AIMesh binary file layout
//
// Header (24 bytes):
//   char[8] magic, i32 version, i32 triangle_count, i32 zero[2]
// Triangle record (42 bytes):
//   f32 v1[3], f32 v2[3], f32 v3[3], i16 unk1, i16 unk2, i16 triangle_reference
//
// All values little-endian. Magic, version and the reserved words are carried
// as-is and never checked.

use aimesh_shared::util::ByteBuffer;

use crate::error::FormatError;

pub const HEADER_SIZE: usize = 24;
pub const TRIANGLE_RECORD_SIZE: usize = 42;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vertex {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn read(buf: &mut ByteBuffer) -> Result<Self, FormatError> {
        Ok(Self {
            x: buf.read_f32()?,
            y: buf.read_f32()?,
            z: buf.read_f32()?,
        })
    }

    fn write(&self, buf: &mut ByteBuffer) {
        buf.write_f32(self.x);
        buf.write_f32(self.y);
        buf.write_f32(self.z);
    }
}

/// One navmesh face. The trailing 16-bit fields are opaque and only passed through.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Triangle {
    pub v1: Vertex,
    pub v2: Vertex,
    pub v3: Vertex,
    pub unk1: i16,
    pub unk2: i16,
    pub triangle_reference: i16,
}

impl Triangle {
    pub fn new(v1: Vertex, v2: Vertex, v3: Vertex) -> Self {
        Self {
            v1,
            v2,
            v3,
            ..Self::default()
        }
    }

    pub fn vertices(&self) -> [Vertex; 3] {
        [self.v1, self.v2, self.v3]
    }

    fn read(buf: &mut ByteBuffer) -> Result<Self, FormatError> {
        Ok(Self {
            v1: Vertex::read(buf)?,
            v2: Vertex::read(buf)?,
            v3: Vertex::read(buf)?,
            unk1: buf.read_i16()?,
            unk2: buf.read_i16()?,
            triangle_reference: buf.read_i16()?,
        })
    }

    fn write(&self, buf: &mut ByteBuffer) {
        self.v1.write(buf);
        self.v2.write(buf);
        self.v3.write(buf);
        buf.write_i16(self.unk1);
        buf.write_i16(self.unk2);
        buf.write_i16(self.triangle_reference);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshFile {
    pub magic: [u8; 8],
    pub version: i32,
    pub zero: [i32; 2],
    pub triangles: Vec<Triangle>,
}

impl MeshFile {
    /// Decode a complete AIMesh file held in memory.
    ///
    /// The buffer must hold at least the header plus one record per declared
    /// triangle; anything after the last record is ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut buf = ByteBuffer::from_bytes(bytes);

        let magic = buf.read_array::<8>()?;
        let version = buf.read_i32()?;
        let declared = buf.read_i32()?;
        let zero = [buf.read_i32()?, buf.read_i32()?];

        let triangle_count = usize::try_from(declared).unwrap_or_else(|_| {
            tracing::warn!("Negative triangle count {} in header, reading none", declared);
            0
        });

        let expected = TRIANGLE_RECORD_SIZE
            .checked_mul(triangle_count)
            .and_then(|body| body.checked_add(HEADER_SIZE))
            .unwrap_or(usize::MAX);
        if bytes.len() < expected {
            return Err(FormatError::Truncated {
                expected,
                actual: bytes.len(),
                triangles: triangle_count,
            });
        }

        let mut triangles = Vec::with_capacity(triangle_count);
        for _ in 0..triangle_count {
            triangles.push(Triangle::read(&mut buf)?);
        }

        if buf.remaining() > 0 {
            tracing::debug!("Ignoring {} trailing bytes after triangle data", buf.remaining());
        }

        tracing::debug!(
            "Decoded AIMesh '{}' version={} triangles={}",
            String::from_utf8_lossy(&magic),
            version,
            triangles.len()
        );

        Ok(Self {
            magic,
            version,
            zero,
            triangles,
        })
    }

    /// Encode in the on-disk layout; the header count is `triangles.len()`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf =
            ByteBuffer::with_capacity(HEADER_SIZE + TRIANGLE_RECORD_SIZE * self.triangles.len());
        buf.append(&self.magic);
        buf.write_i32(self.version);
        buf.write_i32(i32::try_from(self.triangles.len()).unwrap_or(i32::MAX));
        buf.write_i32(self.zero[0]);
        buf.write_i32(self.zero[1]);
        for triangle in &self.triangles {
            triangle.write(&mut buf);
        }
        buf.into_inner()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Magic tag as text, for logging.
    pub fn magic_str(&self) -> String {
        String::from_utf8_lossy(&self.magic).into_owned()
    }
}
