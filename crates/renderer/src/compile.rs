use wgpu::naga;

use crate::error::{RendererError, ShaderStageKind};

/// Fixed vertex stage shared by every program.
///
/// Consumes the full-screen quad's `a_position` attribute and nothing else;
/// fragment shaders never need to provide a vertex stage of their own.
pub(crate) const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 a_position;

void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

/// Parses and validates one GLSL stage into naga IR.
///
/// Going through the frontend ourselves (instead of handing the string to
/// `create_shader_module`) keeps diagnostics synchronous and lets the error
/// name the stage together with the compiler's rendered message.
pub(crate) fn parse_stage(
    stage: ShaderStageKind,
    source: &str,
) -> Result<naga::Module, RendererError> {
    let naga_stage = match stage {
        ShaderStageKind::Vertex => naga::ShaderStage::Vertex,
        ShaderStageKind::Fragment => naga::ShaderStage::Fragment,
    };

    let module = naga::front::glsl::Frontend::default()
        .parse(&naga::front::glsl::Options::from(naga_stage), source)
        .map_err(|errors| RendererError::ShaderCompile {
            stage,
            log: errors.emit_to_string(source),
        })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|error| RendererError::ShaderCompile {
        stage,
        log: error.emit_to_string(source),
    })?;

    Ok(module)
}

/// Program-level checks naga has no link step for.
///
/// A stage can be individually valid yet unusable in a program: no `main`
/// fragment entry point, or resource bindings outside the documented
/// frame-uniform interface (one std140 block at set 0, binding 0). Both are
/// reported as link failures so callers can distinguish them from stage
/// compiles.
pub(crate) fn check_linkage(fragment: &naga::Module) -> Result<(), RendererError> {
    let has_entry = fragment
        .entry_points
        .iter()
        .any(|entry| entry.stage == naga::ShaderStage::Fragment && entry.name == "main");
    if !has_entry {
        return Err(RendererError::Link {
            log: "fragment stage declares no `main` entry point".into(),
        });
    }

    for (_, variable) in fragment.global_variables.iter() {
        if let Some(binding) = &variable.binding {
            let is_frame_block = binding.group == 0
                && binding.binding == 0
                && variable.space == naga::AddressSpace::Uniform;
            if !is_frame_block {
                return Err(RendererError::Link {
                    log: format!(
                        "fragment stage binds set {} binding {}, outside the frame-uniform interface",
                        binding.group, binding.binding
                    ),
                });
            }
        }
    }

    Ok(())
}

/// Hands validated IR to the device.
pub(crate) fn create_module(
    device: &wgpu::Device,
    label: &str,
    module: naga::Module,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Naga(std::borrow::Cow::Owned(module)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_FRAGMENT: &str = r"#version 450
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform FrameUniforms {
    vec2 _iResolution;
    float _iTime;
    float _pad;
} frame;

void main() {
    vec2 uv = gl_FragCoord.xy / frame._iResolution;
    outColor = vec4(uv, sin(frame._iTime) * 0.5 + 0.5, 1.0);
}
";

    #[test]
    fn fixed_vertex_stage_compiles() {
        parse_stage(ShaderStageKind::Vertex, VERTEX_SHADER_GLSL).expect("vertex stage is valid");
    }

    #[test]
    fn valid_fragment_compiles_and_links() {
        let module = parse_stage(ShaderStageKind::Fragment, VALID_FRAGMENT).expect("compiles");
        check_linkage(&module).expect("links");
    }

    #[test]
    fn syntax_error_names_the_fragment_stage() {
        let err = parse_stage(
            ShaderStageKind::Fragment,
            "#version 450\nvoid main() { this is not glsl }",
        )
        .expect_err("parse must fail");
        match err {
            RendererError::ShaderCompile { stage, log } => {
                assert_eq!(stage, ShaderStageKind::Fragment);
                assert!(!log.is_empty());
            }
            other => panic!("expected a compile error, got {other:?}"),
        }
    }

    #[test]
    fn missing_entry_point_is_a_link_error() {
        let module = parse_stage(
            ShaderStageKind::Fragment,
            "#version 450\nfloat helper() { return 1.0; }",
        )
        .expect("helpers alone are valid IR");
        let err = check_linkage(&module).expect_err("linkage must fail");
        assert!(matches!(err, RendererError::Link { .. }));
    }

    #[test]
    fn foreign_bindings_are_a_link_error() {
        let module = parse_stage(
            ShaderStageKind::Fragment,
            r"#version 450
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 1) uniform Extra {
    float extra_value;
} extra;

void main() {
    outColor = vec4(extra.extra_value);
}
",
        )
        .expect("stage itself is valid");
        let err = check_linkage(&module).expect_err("linkage must fail");
        match err {
            RendererError::Link { log } => assert!(log.contains("binding 1")),
            other => panic!("expected a link error, got {other:?}"),
        }
    }

    #[test]
    fn fragment_may_omit_the_uniform_block() {
        // Shader authors can drop declarations they do not use; the bound
        // group is simply ignored by such a program.
        let module = parse_stage(
            ShaderStageKind::Fragment,
            r"#version 450
layout(location = 0) out vec4 outColor;

void main() {
    outColor = vec4(0.0, 0.0, 0.0, 1.0);
}
",
        )
        .expect("compiles");
        check_linkage(&module).expect("links without the block");
    }
}
