use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use cgmath::{InnerSpace, Vector3, Zero};

use crate::data_structures::vertex::MeshVertex;

/// Colour given to every vertex read from a geometry file.
pub const PLACEHOLDER_COLOR: [f32; 4] = [1.0, 0.0, 1.0, 1.0];

/// A problem with a single line of a geometry file. Parsing continues past these.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("line {line}: {kind} (`{text}`)")]
pub struct LineIssue {
    pub line: usize,
    pub kind: IssueKind,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum IssueKind {
    #[error("vertex record needs three numbers")]
    MalformedVertex,
    #[error("face record needs exactly three vertex indices")]
    MalformedFace,
    #[error("vertex index {index} is outside 1..={vertices}")]
    IndexOutOfRange { index: u32, vertices: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("cannot open geometry file '{0}'")]
    Open(PathBuf, #[source] std::io::Error),

    #[error("failed to read geometry file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("geometry file '{0}' contains no usable faces")]
    Empty(PathBuf),

    #[error("geometry file '{path}' has {} malformed line(s)", .issues.len())]
    Rejected { path: PathBuf, issues: Vec<LineIssue> },
}

/// Result of parsing a `v`/`f` geometry file.
#[derive(Clone, Debug, Default)]
pub struct ParsedGeometry {
    /// Positions in file order.
    pub positions: Vec<Vector3<f32>>,
    /// Zero-based triangle list into `positions`, only for faces that were accepted.
    pub indices: Vec<u32>,
    /// One vertex per face corner: no sharing, no index buffer.
    pub vertices: Vec<MeshVertex>,
    pub issues: Vec<LineIssue>,
}

impl ParsedGeometry {
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Open and parse a geometry file.
///
/// Only a file that cannot be opened or read is an error; malformed lines end up in
/// [`ParsedGeometry::issues`] and the caller decides what to do with them.
pub fn load_geometry(path: impl AsRef<Path>) -> Result<ParsedGeometry, GeometryError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| GeometryError::Open(path.to_path_buf(), e))?;
    let parsed =
        parse_geometry(BufReader::new(file)).map_err(|e| GeometryError::Read(path.to_path_buf(), e))?;
    for issue in &parsed.issues {
        log::warn!("{}: {}", path.display(), issue);
    }
    log::debug!(
        "parsed {}: {} positions, {} faces",
        path.display(),
        parsed.positions.len(),
        parsed.face_count()
    );
    Ok(parsed)
}

/**
 * Line-oriented parser for `v x y z` and `f i j k` records (1-based indices).
 *
 * Normals are smoothed: every face adds its unit normal (counter-clockwise winding) to
 * the three positions it references, and each emitted corner gets the normalized sum
 * for its position. Corners are still emitted per face, so shared positions are
 * duplicated and no index array is produced.
 */
pub fn parse_geometry<R: BufRead>(reader: R) -> std::io::Result<ParsedGeometry> {
    let mut parsed = ParsedGeometry::default();
    // (line number, raw 1-based indices) for faces; validated once all positions are known
    let mut faces: Vec<(usize, [u32; 3])> = Vec::new();

    for (number, raw) in reader.split(b'\n').enumerate() {
        let raw = raw?;
        // invalid UTF-8 becomes U+FFFD and fails to parse as a number
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_end_matches('\r');
        let number = number + 1;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let coords: Vec<f32> = tokens
                    .by_ref()
                    .take(3)
                    .map_while(|t| t.parse().ok())
                    .collect();
                match coords[..] {
                    [x, y, z] => parsed.positions.push(Vector3::new(x, y, z)),
                    _ => parsed.issues.push(LineIssue {
                        line: number,
                        kind: IssueKind::MalformedVertex,
                        text: line.to_owned(),
                    }),
                }
            }
            Some("f") => {
                let indices: Option<Vec<u32>> = tokens.map(|t| t.parse().ok()).collect();
                match indices.as_deref() {
                    Some(&[a, b, c]) => faces.push((number, [a, b, c])),
                    _ => parsed.issues.push(LineIssue {
                        line: number,
                        kind: IssueKind::MalformedFace,
                        text: line.to_owned(),
                    }),
                }
            }
            _ => (),
        }
    }

    let count = parsed.positions.len();
    for (line, face) in faces {
        match face.iter().find(|&&i| i == 0 || i as usize > count) {
            Some(&index) => parsed.issues.push(LineIssue {
                line,
                kind: IssueKind::IndexOutOfRange {
                    index,
                    vertices: count,
                },
                text: format!("f {} {} {}", face[0], face[1], face[2]),
            }),
            None => parsed.indices.extend(face.iter().map(|i| i - 1)),
        }
    }
    parsed.issues.sort_by_key(|issue| issue.line);

    let normals = smooth_normals(&parsed.positions, &parsed.indices);
    parsed.vertices = parsed
        .indices
        .iter()
        .map(|&i| {
            let i = i as usize;
            MeshVertex::new(
                parsed.positions[i].into(),
                PLACEHOLDER_COLOR,
                [0.0, 0.0],
                normals[i].into(),
            )
        })
        .collect();

    Ok(parsed)
}

/// Unit normal of a counter-clockwise triangle, or zero when it is degenerate.
pub fn face_normal(a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> Vector3<f32> {
    let n = (b - a).cross(c - a);
    if n.magnitude2() > 0.0 {
        n.normalize()
    } else {
        Vector3::zero()
    }
}

/// Sum of incident face normals per position, normalized.
pub fn smooth_normals(positions: &[Vector3<f32>], indices: &[u32]) -> Vec<Vector3<f32>> {
    let mut sums = vec![Vector3::zero(); positions.len()];
    for c in indices.chunks_exact(3) {
        let n = face_normal(
            positions[c[0] as usize],
            positions[c[1] as usize],
            positions[c[2] as usize],
        );
        sums[c[0] as usize] += n;
        sums[c[1] as usize] += n;
        sums[c[2] as usize] += n;
    }
    sums.into_iter()
        .map(|n| if n.magnitude2() > 0.0 { n.normalize() } else { n })
        .collect()
}
