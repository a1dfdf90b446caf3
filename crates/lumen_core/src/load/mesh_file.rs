//! Mesh data files.
//!
//! ```text
//! MESH4
//! v -1 0 -1
//! v  1 0 -1
//! v  1 0  1
//! v -1 0  1
//! n 0 1 0
//! f 1/1 2/1 3/1 4/1
//! ```
//!
//! The header declares triangles (`MESH3`) or quads (`MESH4`). Vertices go
//! through the instancing transform (scale, rotate, translate), normals
//! are rotated and renormalized, faces reference both by 1-based index.

use std::fs;
use std::path::Path;

use log::{debug, warn};
use lumen_math::{Transform, Vec3};

use super::{LoadError, LoadResult, ParseError};
use crate::{Face, Material, Mesh, MeshPrimitive, Vertex};

/// Load a mesh data file and instance it with `transform`.
pub fn load_mesh(path: impl AsRef<Path>, transform: &Transform, material: Material) -> LoadResult<Mesh> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mesh = parse_mesh(&source, transform, material).map_err(|source| LoadError::MeshFormat {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        "Loaded mesh {}: {} faces",
        path.display(),
        mesh.faces().len()
    );
    Ok(mesh)
}

/// Parse mesh data text. Any malformed line fails the whole mesh.
pub fn parse_mesh(source: &str, transform: &Transform, material: Material) -> Result<Mesh, ParseError> {
    let mut lines = source.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));

    let primitive = match lines.next() {
        Some((_, header)) => parse_header(header).ok_or_else(|| {
            ParseError::new(1, format!("expected MESH3 or MESH4 header, found `{header}`"))
        })?,
        None => return Err(ParseError::new(1, "empty mesh file")),
    };

    let mut positions: Vec<Vec3> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut mesh = Mesh::new(primitive, material);

    for (line_num, line) in lines {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let record = tokens.next().unwrap_or_default();
        let rest: Vec<&str> = tokens.collect();

        match record {
            "v" => {
                let p = parse_vec3(&rest).map_err(|m| ParseError::new(line_num, m))?;
                positions.push(transform.transform_point(p));
            }
            "n" => {
                let n = parse_vec3(&rest).map_err(|m| ParseError::new(line_num, m))?;
                normals.push(transform.transform_normal(n));
            }
            "f" => {
                if rest.len() != primitive.vertex_count() {
                    return Err(ParseError::new(
                        line_num,
                        format!(
                            "face has {} vertices, header declares {}",
                            rest.len(),
                            primitive.vertex_count()
                        ),
                    ));
                }
                let vertices = rest
                    .iter()
                    .map(|pair| resolve_vertex(pair, &positions, &normals))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|m| ParseError::new(line_num, m))?;

                // Count was checked above
                if let Some(face) = Face::from_vertices(&vertices) {
                    mesh.add_face(face);
                }
            }
            other => {
                return Err(ParseError::new(line_num, format!("unknown record `{other}`")));
            }
        }
    }

    if mesh.faces().is_empty() {
        warn!("Mesh data has no faces");
    }
    Ok(mesh)
}

fn parse_header(header: &str) -> Option<MeshPrimitive> {
    let count = header.strip_prefix("MESH")?.trim().parse::<usize>().ok()?;
    MeshPrimitive::from_vertex_count(count)
}

fn parse_vec3(values: &[&str]) -> Result<Vec3, String> {
    if values.len() != 3 {
        return Err(format!("expected 3 numbers, found {}", values.len()));
    }
    let mut v = [0.0; 3];
    for (slot, text) in v.iter_mut().zip(values) {
        *slot = text
            .parse::<f64>()
            .map_err(|_| format!("invalid number `{text}`"))?;
    }
    Ok(Vec3::from_array(v))
}

/// Resolve a `v/n` pair of 1-based indices.
fn resolve_vertex(pair: &str, positions: &[Vec3], normals: &[Vec3]) -> Result<Vertex, String> {
    let (v, n) = pair
        .split_once('/')
        .ok_or_else(|| format!("expected `v/n` index pair, found `{pair}`"))?;

    let lookup = |text: &str, pool: &[Vec3], what: &str| -> Result<Vec3, String> {
        let idx = text
            .parse::<usize>()
            .map_err(|_| format!("invalid {what} index `{text}`"))?;
        idx.checked_sub(1)
            .and_then(|i| pool.get(i))
            .copied()
            .ok_or_else(|| format!("{what} index {idx} out of range (have {})", pool.len()))
    };

    Ok(Vertex::new(
        lookup(v, positions, "vertex")?,
        lookup(n, normals, "normal")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Object;

    const QUAD: &str = "MESH4
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1

# single up-facing normal
n 0 2 0
f 1/1 2/1 3/1 4/1
";

    #[test]
    fn test_parse_quad_mesh() {
        let mesh = parse_mesh(QUAD, &Transform::default(), Material::default()).expect("valid mesh");

        assert_eq!(mesh.primitive(), MeshPrimitive::Quads);
        assert_eq!(mesh.faces().len(), 1);
        let face = &mesh.faces()[0];
        assert!(face.is_quad());
        // Normals are normalized on load
        assert_eq!(face.vertices()[0].normal, Vec3::Y);
    }

    #[test]
    fn test_transform_order_is_scale_rotate_translate() {
        let transform = Transform::new(
            Vec3::new(0.0, 5.0, 0.0),
            Transform::axis_angle_degrees(Vec3::Z, 90.0),
            Vec3::new(2.0, 1.0, 1.0),
        );
        let mesh = parse_mesh(QUAD, &transform, Material::default()).expect("valid mesh");
        let v0 = mesh.faces()[0].vertices()[0];

        // (-1,0,-1) -> (-2,0,-1) -> (0,-2,-1) -> (0,3,-1)
        assert!((v0.position - Vec3::new(0.0, 3.0, -1.0)).length() < 1e-9);
        // Normal +Y rotated 90 degrees about Z is -X, unaffected by scale
        assert!((v0.normal - Vec3::NEG_X).length() < 1e-9);
        assert!(mesh.bounding_box().contains_point(v0.position));
    }

    #[test]
    fn test_parse_triangles() {
        let src = "MESH3\nv 0 0 0\nv 1 0 0\nv 0 1 0\nn 0 0 1\nf 1/1 2/1 3/1\n";
        let mesh = parse_mesh(src, &Transform::default(), Material::default()).expect("valid mesh");
        assert_eq!(mesh.primitive(), MeshPrimitive::Triangles);
        assert!(!mesh.faces()[0].is_quad());
    }

    #[test]
    fn test_bad_header() {
        let err = parse_mesh("MESH5\n", &Transform::default(), Material::default()).unwrap_err();
        assert_eq!(err.line, 1);

        let err = parse_mesh("", &Transform::default(), Material::default()).unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_face_arity_must_match_header() {
        let src = "MESH4\nv 0 0 0\nv 1 0 0\nv 0 1 0\nn 0 0 1\nf 1/1 2/1 3/1\n";
        let err = parse_mesh(src, &Transform::default(), Material::default()).unwrap_err();
        assert_eq!(err.line, 6);
    }

    #[test]
    fn test_out_of_range_indices_fail() {
        let zero = "MESH3\nv 0 0 0\nv 1 0 0\nv 0 1 0\nn 0 0 1\nf 0/1 2/1 3/1\n";
        assert_eq!(
            parse_mesh(zero, &Transform::default(), Material::default()).unwrap_err().line,
            6
        );

        let missing_normal = "MESH3\nv 0 0 0\nv 1 0 0\nv 0 1 0\nn 0 0 1\nf 1/1 2/2 3/1\n";
        let err = parse_mesh(missing_normal, &Transform::default(), Material::default()).unwrap_err();
        assert!(err.message.contains("normal index 2"));
    }

    #[test]
    fn test_unknown_record_fails() {
        let src = "MESH3\nv 0 0 0\nvt 0 0\n";
        let err = parse_mesh(src, &Transform::default(), Material::default()).unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("vt"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_mesh(
            "/nonexistent/lumen/mesh.dat",
            &Transform::default(),
            Material::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
