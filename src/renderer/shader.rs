use std::borrow::Cow;
use std::path::Path;

pub const BUILTIN_SHADER: &str = include_str!("../shader.wgsl");

/// WGSL source from `path`, or the built-in shader when no path is given or it cannot be read.
pub fn load_source(path: Option<&Path>) -> Cow<'static, str> {
    let Some(path) = path else {
        return Cow::Borrowed(BUILTIN_SHADER);
    };

    match std::fs::read_to_string(path) {
        Ok(source) => {
            log::info!("Loaded shader {:?}", path);
            Cow::Owned(source)
        }
        Err(err) => {
            log::error!(
                "Impossible to open shader {:?} ({}). Using the built-in shader.",
                path,
                err
            );
            Cow::Borrowed(BUILTIN_SHADER)
        }
    }
}

/// Compile a shader module inside a validation error scope.
pub async fn compile(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> Result<wgpu::ShaderModule, wgpu::Error> {
    log::info!("Compiling shader: {label}");

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
    });

    match device.pop_error_scope().await {
        Some(err) => Err(err),
        None => Ok(module),
    }
}

/// Source to retry with after `failed` did not compile or link.
///
/// `None` once the built-in shader itself has failed.
pub fn fallback_for(failed: &str) -> Option<&'static str> {
    (failed != BUILTIN_SHADER).then_some(BUILTIN_SHADER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_path_uses_builtin() {
        assert_eq!(load_source(None), BUILTIN_SHADER);
    }

    #[test]
    fn unreadable_path_falls_back_to_builtin() {
        let source = load_source(Some(Path::new("missing/shader.wgsl")));
        assert!(matches!(source, Cow::Borrowed(_)));
    }

    #[test]
    fn custom_source_falls_back_to_builtin() {
        assert_eq!(fallback_for("@vertex fn broken("), Some(BUILTIN_SHADER));
    }

    #[test]
    fn builtin_failure_has_no_fallback() {
        assert_eq!(fallback_for(BUILTIN_SHADER), None);
    }

    #[test]
    fn builtin_declares_both_entry_points() {
        assert!(BUILTIN_SHADER.contains("fn vs_main"));
        assert!(BUILTIN_SHADER.contains("fn fs_main"));
    }
}
