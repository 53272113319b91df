//! Placeholder impls that keep the target module compilable.
//!
//! The stub provides every item the finished output will provide, with empty
//! bodies, so the target crate builds before the generator has run. It is
//! written unconditionally, including in stubs-only mode.

use std::fmt::Write as _;

use crate::config::GeneratorConfig;
use crate::error::BootstrapError;
use crate::fs_helpers::OutputDir;

/// Prefix of the type aliases the launcher uses to name each target type.
pub(crate) const EXPORTER_PREFIX: &str = "JsongenExporter_";

/// Renders and writes the stub over the output file.
pub(crate) fn write_stub(config: &GeneratorConfig, dir: &OutputDir) -> Result<(), BootstrapError> {
    let name = config.output_file_name()?;
    let content = render_stub(config)?;
    dir.write(name, content.as_bytes())
}

/// Renders the stub source for `config`.
pub(crate) fn render_stub(config: &GeneratorConfig) -> Result<String, BootstrapError> {
    let mut out = String::new();

    if let Some(header) = config.build_tags.cfg_header()? {
        writeln!(out, "{header}")?;
        writeln!(out)?;
    }
    writeln!(out, "// TEMPORARY AUTOGENERATED FILE: jsongen stub code to make the module")?;
    writeln!(out, "// compilable during generation.")?;

    let library = &config.library;
    if !config.type_names.is_empty() {
        writeln!(out)?;
        writeln!(out, "use {};", library.lexer)?;
        writeln!(out, "use {};", library.writer)?;
    }

    let writer = last_segment(&library.writer);
    let lexer = last_segment(&library.lexer);
    for ty in &config.type_names {
        writeln!(out)?;
        if !config.features.no_std_marshalers {
            writeln!(out, "impl ::serde::Serialize for super::{ty} {{")?;
            writeln!(
                out,
                "    fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {{"
            )?;
            writeln!(out, "        serializer.serialize_unit()")?;
            writeln!(out, "    }}")?;
            writeln!(out, "}}")?;
            writeln!(out, "impl<'de> ::serde::Deserialize<'de> for super::{ty} {{")?;
            writeln!(
                out,
                "    fn deserialize<D: ::serde::Deserializer<'de>>(_deserializer: D) -> Result<Self, D::Error> {{"
            )?;
            writeln!(
                out,
                "        Err(<D::Error as ::serde::de::Error>::custom(\"jsongen stub\"))"
            )?;
            writeln!(out, "    }}")?;
            writeln!(out, "}}")?;
        }
        writeln!(out, "impl {} for super::{ty} {{", library.marshaler)?;
        writeln!(out, "    fn marshal_jsongen(&self, _w: &mut {writer}) {{}}")?;
        writeln!(out, "}}")?;
        writeln!(out, "impl {} for super::{ty} {{", library.unmarshaler)?;
        writeln!(out, "    fn unmarshal_jsongen(&mut self, _l: &mut {lexer}) {{}}")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "#[doc(hidden)]")?;
        writeln!(out, "#[allow(non_camel_case_types)]")?;
        writeln!(out, "pub type {EXPORTER_PREFIX}{ty} = super::{ty};")?;
    }

    Ok(out)
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}
