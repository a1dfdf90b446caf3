//! Scene description files.
//!
//! One directive per line, selected by its leading letter:
//!
//! ```text
//! s c(x y z) r(rad) kd(r g b) ks(r g b) s(exp) kr(k) ke(r g b)
//! p n(x y z) d(dist) kd(..) ks(..) s(..) kr(..) ke(..)
//! f c(x y z) r(rad) i(iterations) kd(..) ks(..) s(..) kr(..) ke(..)
//! l p(x y z) c(r g b)
//! c p(x y z) t(tx ty tz) fov(deg)
//! m <datafile> pos(x y z) rot(rx ry rz angle_deg) scale(sx sy sz) kd(..) ..
//! a c(r g b)
//! ```
//!
//! Material fields may be omitted and default to [`Material::default`].
//! Blank lines and `#` comments are skipped. A line that fails to parse is
//! reported as a [`Diagnostic`] and the rest of the file still loads.

use std::fs;
use std::path::Path;

use log::{info, warn};
use lumen_math::{Transform, Vec3};

use super::{load_mesh, Diagnostic, LoadError, LoadResult, LoadedScene};
use crate::{Camera, Material, Plane, PointLight, Scene, Sphere, SphereFlake};

/// Deepest sphereflake accepted; each level multiplies the sphere count by 9.
const MAX_FLAKE_ITERATIONS: u32 = 7;

/// Load a scene file. Relative mesh paths resolve against its directory.
pub fn load_scene(path: impl AsRef<Path>) -> LoadResult<LoadedScene> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let loaded = load_scene_from_str(&source, base_dir);

    info!(
        "Loaded scene {}: {} objects, {} lights, {} skipped lines",
        path.display(),
        loaded.scene.objects().len(),
        loaded.scene.lights().len(),
        loaded.diagnostics.len()
    );
    Ok(loaded)
}

/// Parse scene text. Never fails as a whole; see [`LoadedScene::diagnostics`].
pub fn load_scene_from_str(source: &str, base_dir: &Path) -> LoadedScene {
    let mut scene = Scene::new();
    let mut diagnostics = Vec::new();
    let mut has_camera = false;

    for (idx, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let result = parse_directive(line, base_dir).map(|directive| match directive {
            Directive::Object(object) => {
                scene.add_boxed(object);
            }
            Directive::Camera(camera) => {
                scene.set_camera(camera);
                has_camera = true;
            }
            Directive::Ambient(color) => scene.set_ambient(color),
        });

        if let Err(message) = result {
            let diag = Diagnostic {
                line: idx + 1,
                text: line.to_string(),
                message,
            };
            warn!("{diag}");
            diagnostics.push(diag);
        }
    }

    if !has_camera {
        info!("No camera directive, using the default camera");
    }

    LoadedScene { scene, diagnostics }
}

enum Directive {
    Object(Box<dyn crate::Object>),
    Camera(Camera),
    Ambient(Vec3),
}

fn parse_directive(line: &str, base_dir: &Path) -> Result<Directive, String> {
    let (keyword, rest) = line
        .split_once(char::is_whitespace)
        .unwrap_or((line, ""));
    let fields = Fields::parse(rest)?;

    let directive = match keyword {
        "s" => {
            fields.expect_only(&["c", "r"], true)?;
            Directive::Object(Box::new(Sphere::new(
                fields.vec3("c")?,
                fields.scalar("r")?,
                fields.material()?,
            )))
        }
        "p" => {
            fields.expect_only(&["n", "d"], true)?;
            Directive::Object(Box::new(Plane::new(
                fields.vec3("n")?,
                fields.scalar("d")?,
                fields.material()?,
            )))
        }
        "f" => {
            fields.expect_only(&["c", "r", "i"], true)?;
            let iterations = fields.scalar("i")?;
            if iterations < 0.0 || iterations.fract() != 0.0 {
                return Err(format!("i({iterations}) must be a non-negative integer"));
            }
            if iterations > MAX_FLAKE_ITERATIONS as f64 {
                return Err(format!("i({iterations}) exceeds the limit of {MAX_FLAKE_ITERATIONS}"));
            }
            Directive::Object(Box::new(SphereFlake::new(
                fields.vec3("c")?,
                fields.scalar("r")?,
                iterations as u32,
                fields.material()?,
            )))
        }
        "l" => {
            fields.expect_only(&["p", "c"], false)?;
            Directive::Object(Box::new(PointLight::new(fields.vec3("p")?, fields.vec3("c")?)))
        }
        "c" => {
            fields.expect_only(&["p", "t", "fov"], false)?;
            let camera = Camera::new(fields.vec3("p")?, fields.vec3("t")?)
                .with_fov_degrees(fields.scalar("fov")?);
            Directive::Camera(camera)
        }
        "a" => {
            fields.expect_only(&["c"], false)?;
            Directive::Ambient(fields.vec3("c")?)
        }
        "m" => {
            fields.expect_only(&["pos", "rot", "scale"], true)?;
            let file = match fields.words.as_slice() {
                [file] => *file,
                [] => return Err("missing mesh data file".to_string()),
                _ => return Err("expected a single mesh data file".to_string()),
            };
            let transform = mesh_transform(&fields)?;
            let mesh = load_mesh(base_dir.join(file), &transform, fields.material()?)
                .map_err(|e| e.to_string())?;
            Directive::Object(Box::new(mesh))
        }
        other => return Err(format!("unknown directive `{other}`")),
    };

    if keyword != "m" && !fields.words.is_empty() {
        return Err(format!("unexpected `{}`", fields.words.join(" ")));
    }
    Ok(directive)
}

/// `pos`, `rot` and `scale` are optional and default to identity.
fn mesh_transform(fields: &Fields<'_>) -> Result<Transform, String> {
    let translation = fields.opt_vec3("pos")?.unwrap_or(Vec3::ZERO);
    let scale = fields.opt_vec3("scale")?.unwrap_or(Vec3::ONE);
    let rotation = match fields.get("rot") {
        None => Transform::default().rotation,
        Some([x, y, z, angle]) => Transform::axis_angle_degrees(Vec3::new(*x, *y, *z), *angle),
        Some(values) => {
            return Err(format!(
                "rot(...) takes an axis and an angle, found {} numbers",
                values.len()
            ))
        }
    };
    Ok(Transform::new(translation, rotation, scale))
}

const MATERIAL_FIELDS: [&str; 5] = ["kd", "ks", "s", "kr", "ke"];

/// Named numeric groups (`name(1 2 3)`) and bare words of one directive.
struct Fields<'a> {
    groups: Vec<(&'a str, Vec<f64>)>,
    words: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn parse(mut rest: &'a str) -> Result<Self, String> {
        let mut groups = Vec::new();
        let mut words = Vec::new();

        rest = rest.trim_start();
        while !rest.is_empty() {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '(')
                .unwrap_or(rest.len());
            let (word, tail) = rest.split_at(end);

            if let Some(tail) = tail.strip_prefix('(') {
                if word.is_empty() {
                    return Err("unnamed `(...)` group".to_string());
                }
                let close = tail
                    .find(')')
                    .ok_or_else(|| format!("unclosed `{word}(`"))?;
                let values = tail[..close]
                    .split_whitespace()
                    .map(|v| {
                        v.parse::<f64>()
                            .map_err(|_| format!("invalid number `{v}` in {word}(...)"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if groups.iter().any(|(name, _)| *name == word) {
                    return Err(format!("{word}(...) given twice"));
                }
                groups.push((word, values));
                rest = tail[close + 1..].trim_start();
            } else {
                words.push(word);
                rest = tail.trim_start();
            }
        }

        Ok(Self { groups, words })
    }

    /// Reject groups outside `allowed` (plus material fields if asked).
    fn expect_only(&self, allowed: &[&str], with_material: bool) -> Result<(), String> {
        for (name, _) in &self.groups {
            let known = allowed.contains(name) || (with_material && MATERIAL_FIELDS.contains(name));
            if !known {
                return Err(format!("unknown field `{name}(...)`"));
            }
        }
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&[f64]> {
        self.groups
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_slice())
    }

    fn opt_vec3(&self, name: &str) -> Result<Option<Vec3>, String> {
        match self.get(name) {
            None => Ok(None),
            Some([x, y, z]) => Ok(Some(Vec3::new(*x, *y, *z))),
            Some(v) => Err(format!("{name}(...) needs 3 numbers, found {}", v.len())),
        }
    }

    fn vec3(&self, name: &str) -> Result<Vec3, String> {
        self.opt_vec3(name)?
            .ok_or_else(|| format!("missing {name}(...)"))
    }

    fn opt_scalar(&self, name: &str) -> Result<Option<f64>, String> {
        match self.get(name) {
            None => Ok(None),
            Some([x]) => Ok(Some(*x)),
            Some(v) => Err(format!("{name}(...) needs 1 number, found {}", v.len())),
        }
    }

    fn scalar(&self, name: &str) -> Result<f64, String> {
        self.opt_scalar(name)?
            .ok_or_else(|| format!("missing {name}(...)"))
    }

    fn material(&self) -> Result<Material, String> {
        let defaults = Material::default();
        Ok(Material {
            kd: self.opt_vec3("kd")?.unwrap_or(defaults.kd),
            ks: self.opt_vec3("ks")?.unwrap_or(defaults.ks),
            ke: self.opt_vec3("ke")?.unwrap_or(defaults.ke),
            specexp: self.opt_scalar("s")?.unwrap_or(defaults.specexp),
            kr: self.opt_scalar("kr")?.unwrap_or(defaults.kr),
        })
    }
}
