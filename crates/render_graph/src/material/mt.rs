//! The `.mt` material file format: line-oriented `key=value` with `#`
//! comments.
//!
//! Grounded on `core::config::Config`'s file-loading habit
//! (read-to-string, then parse), narrowed to this crate's own tiny
//! line-oriented grammar rather than TOML/RON, since the format is
//! fixed by convention rather than left open to the config layer.

use std::path::Path;

/// A parsed `.mt` file. Paths are left unresolved; callers
/// load them through their own texture pipeline and pass the resulting
/// handles to [`super::registry::MaterialSystem::create_from_mt`].
#[derive(Debug, Clone, Default)]
pub struct MtFile {
    /// Material name, the file's basename without extension.
    pub name: String,
    /// `base_color` texture path.
    pub base_color: Option<String>,
    /// `diffuse_color` RGBA.
    pub diffuse_color: Option<[f32; 4]>,
    /// `specular_color` RGBA.
    pub specular_color: Option<[f32; 4]>,
    /// `shininess` specular exponent.
    pub shininess: Option<f32>,
    /// `emission_color` RGB.
    pub emission_color: Option<[f32; 3]>,
    /// `normal_map` texture path.
    pub normal_map: Option<String>,
    /// `specular_map` texture path.
    pub specular_map: Option<String>,
    /// `emission_map` texture path.
    pub emission_map: Option<String>,
}

fn parse_floats<const N: usize>(value: &str) -> Option<[f32; N]> {
    let mut out = [0.0f32; N];
    let mut count = 0;
    for (index, part) in value.split(',').enumerate() {
        if index >= N {
            return None;
        }
        out[index] = part.trim().parse().ok()?;
        count += 1;
    }
    (count == N).then_some(out)
}

/// Parse `.mt` file contents. `path` supplies the material's name (its
/// basename without extension); unknown keys are logged and ignored
/// rather than rejected.
pub fn parse(path: &Path, contents: &str) -> MtFile {
    let mut file = MtFile {
        name: path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        ..MtFile::default()
    };

    for (line_number, raw_line) in contents.lines().enumerate() {
        let line = raw_line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            log::warn!(
                "{}:{}: ignoring malformed .mt line (no '='): '{}'",
                path.display(),
                line_number + 1,
                raw_line
            );
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        match key {
            "base_color" => file.base_color = Some(value.to_string()),
            "normal_map" => file.normal_map = Some(value.to_string()),
            "specular_map" => file.specular_map = Some(value.to_string()),
            "emission_map" => file.emission_map = Some(value.to_string()),
            "diffuse_color" => match parse_floats::<4>(value) {
                Some(rgba) => file.diffuse_color = Some(rgba),
                None => log::warn!("{}: malformed diffuse_color '{}'", path.display(), value),
            },
            "specular_color" => match parse_floats::<4>(value) {
                Some(rgba) => file.specular_color = Some(rgba),
                None => log::warn!("{}: malformed specular_color '{}'", path.display(), value),
            },
            "emission_color" => match parse_floats::<3>(value) {
                Some(rgb) => file.emission_color = Some(rgb),
                None => log::warn!("{}: malformed emission_color '{}'", path.display(), value),
            },
            "shininess" => match value.parse() {
                Ok(v) => file.shininess = Some(v),
                Err(_) => log::warn!("{}: malformed shininess '{}'", path.display(), value),
            },
            other => log::warn!("{}: ignoring unknown .mt key '{}'", path.display(), other),
        }
    }

    file
}

/// Read and parse a `.mt` file from disk.
pub fn load(path: &Path) -> std::io::Result<MtFile> {
    let contents = std::fs::read_to_string(path)?;
    Ok(parse(path, &contents))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# a comment line
base_color = textures/brick_diffuse.png
diffuse_color = 1.0, 0.8, 0.6, 1.0
specular_color=0.2,0.2,0.2,1.0
shininess = 32.0
emission_color = 0.0, 0.0, 0.0
normal_map = textures/brick_normal.png
unknown_key = should be ignored
";

    #[test]
    fn parses_recognized_keys_and_derives_name_from_path() {
        let path = Path::new("materials/brick.mt");
        let file = parse(path, SAMPLE);
        assert_eq!(file.name, "brick");
        assert_eq!(file.base_color.as_deref(), Some("textures/brick_diffuse.png"));
        assert_eq!(file.diffuse_color, Some([1.0, 0.8, 0.6, 1.0]));
        assert_eq!(file.specular_color, Some([0.2, 0.2, 0.2, 1.0]));
        assert_eq!(file.shininess, Some(32.0));
        assert_eq!(file.emission_color, Some([0.0, 0.0, 0.0]));
        assert_eq!(file.normal_map.as_deref(), Some("textures/brick_normal.png"));
        assert!(file.specular_map.is_none());
    }

    #[test]
    fn blank_and_comment_only_lines_are_skipped() {
        let file = parse(Path::new("x.mt"), "\n# only a comment\n   \n");
        assert!(file.base_color.is_none());
        assert_eq!(file.name, "x");
    }

    #[test]
    fn malformed_color_is_ignored_not_fatal() {
        let file = parse(Path::new("x.mt"), "diffuse_color = not,a,color\n");
        assert!(file.diffuse_color.is_none());
    }
}
