use std::borrow::Cow;

use crate::error::ConfigError;

/// Shader stage of a library entry point.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    /// Compute and any stage the render pipeline cannot use.
    Other,
}

impl From<naga::ShaderStage> for ShaderStage {
    fn from(stage: naga::ShaderStage) -> Self {
        match stage {
            naga::ShaderStage::Vertex => Self::Vertex,
            naga::ShaderStage::Fragment => Self::Fragment,
            _ => Self::Other,
        }
    }
}

/// A named entry point exported by a [`ShaderLibrary`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EntryPoint {
    pub name: String,
    pub stage: ShaderStage,
    /// `@location` inputs read by the entry point, in declaration order.
    pub inputs: Vec<u32>,
}

/// Precompiled shader library shipped with the binary.
///
/// WGSL source is parsed and validated with naga up front, so a missing or
/// misnamed entry point is reported by name at setup instead of surfacing as a
/// device validation error.
#[derive(Debug, Clone)]
pub struct ShaderLibrary {
    label: String,
    source: Cow<'static, str>,
    entry_points: Vec<EntryPoint>,

    /// Set when the library failed to load; every lookup reports it.
    unavailable: Option<String>,
}

impl ShaderLibrary {
    /// Source of the built-in triangle library.
    pub const TRIANGLE_SOURCE: &'static str = include_str!("shaders/triangle.wgsl");

    /// Loads the built-in triangle library (`vertex_main`, `fragment_main`).
    pub fn triangle() -> Result<Self, ConfigError> {
        Self::from_wgsl("triangle.wgsl", Self::TRIANGLE_SOURCE)
    }

    /// Parses and validates a WGSL library.
    pub fn from_wgsl(
        label: impl Into<String>,
        source: impl Into<Cow<'static, str>>,
    ) -> Result<Self, ConfigError> {
        let label = label.into();
        let source = source.into();

        let compile_error = |reason: String| ConfigError::ShaderCompilation {
            library: label.clone(),
            entry_point: None,
            reason,
        };

        let module = naga::front::wgsl::parse_str(&source)
            .map_err(|err| compile_error(err.emit_to_string(&source)))?;

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|err| compile_error(err.to_string()))?;

        let entry_points = module
            .entry_points
            .iter()
            .map(|ep| EntryPoint {
                name: ep.name.clone(),
                stage: ep.stage.into(),
                inputs: input_locations(&module, &ep.function),
            })
            .collect();

        Ok(Self {
            label,
            source,
            entry_points,
            unavailable: None,
        })
    }

    /// A library that failed to load. Every [`resolve`](Self::resolve) reports `reason`.
    pub fn unavailable(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source: Cow::Borrowed(""),
            entry_points: Vec::new(),
            unavailable: Some(reason.into()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    /// Looks up the entry point `name` for `stage`.
    pub fn resolve(&self, name: &str, stage: ShaderStage) -> Result<&EntryPoint, ConfigError> {
        let fail = |reason: String| ConfigError::ShaderCompilation {
            library: self.label.clone(),
            entry_point: Some(name.to_string()),
            reason,
        };

        if let Some(reason) = &self.unavailable {
            return Err(fail(format!("library unavailable: {reason}")));
        }

        match self.entry_points.iter().find(|ep| ep.name == name) {
            Some(ep) if ep.stage == stage => Ok(ep),
            Some(ep) => Err(fail(format!(
                "entry point `{name}` is a {:?} function, expected {stage:?}",
                ep.stage
            ))),
            None => {
                let available: Vec<&str> =
                    self.entry_points.iter().map(|ep| ep.name.as_str()).collect();
                Err(fail(format!(
                    "entry point `{name}` ({stage:?}) not found; available: {available:?}"
                )))
            }
        }
    }
}

/// Collects location bindings from arguments and from struct-typed arguments' members.
fn input_locations(module: &naga::Module, function: &naga::Function) -> Vec<u32> {
    let location = |binding: &Option<naga::Binding>| match binding {
        Some(naga::Binding::Location { location, .. }) => Some(*location),
        _ => None,
    };

    let mut inputs = Vec::new();
    for arg in &function.arguments {
        if arg.binding.is_some() {
            inputs.extend(location(&arg.binding));
        } else if let naga::TypeInner::Struct { members, .. } = &module.types[arg.ty].inner {
            inputs.extend(members.iter().filter_map(|m| location(&m.binding)));
        }
    }
    inputs
}
