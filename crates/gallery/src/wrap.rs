/// GLSL prologue prepended to every gallery shader body.
///
/// Declares the frame-uniform block the renderer documents (set 0, binding 0:
/// `iResolution` then `iTime`) and maps the fixed uniform names onto it via
/// macros so bodies written against the bare names keep compiling.
const PROLOGUE: &str = r"#version 450
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform FrameUniforms {
    vec2 _iResolution;
    float _iTime;
    float _pad;
} frame;

#define iResolution frame._iResolution
#define iTime frame._iTime
";

/// GLSL epilogue that remaps coordinates and delegates to `mainImage`.
///
/// `gl_FragCoord` has a top-left origin under Vulkan conventions; gallery
/// bodies were written for a bottom-left origin, so the y axis is flipped
/// before calling into them.
const EPILOGUE: &str = r"void main() {
    vec2 fragCoord = vec2(gl_FragCoord.x, iResolution.y - gl_FragCoord.y);
    mainImage(outColor, fragCoord);
}
";

/// Produces a complete, compilable fragment stage from a `mainImage` body.
///
/// The renderer concatenates nothing itself; this is the embedding side of
/// that contract. Lines the prologue supersedes are stripped first:
/// a leading `#version`, WebGL `precision` directives, and declarations of
/// the fixed uniform names.
pub fn wrap_fragment(body: &str) -> String {
    let mut sanitized = String::new();
    let mut skipped_version = false;
    for line in body.lines() {
        let trimmed = line.trim_start();
        if !skipped_version && trimmed.starts_with("#version") {
            skipped_version = true;
            continue;
        }
        if trimmed.starts_with("precision ") {
            continue;
        }
        let redeclares_uniform = trimmed.starts_with("uniform ")
            && (trimmed.contains("iResolution") || trimmed.contains("iTime"));
        if redeclares_uniform {
            continue;
        }
        sanitized.push_str(line);
        sanitized.push('\n');
    }

    format!("{PROLOGUE}\n#line 1\n{sanitized}{EPILOGUE}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_strips_superseded_declarations() {
        let body = r#"
            #version 300 es
            precision mediump float;
            uniform float iTime;
            uniform vec2 iResolution;
            void mainImage(out vec4 o, in vec2 fragCoord) {
                o = vec4(fragCoord, 0.0, 1.0);
            }
        "#;

        let wrapped = wrap_fragment(body);
        assert!(!wrapped.contains("uniform float iTime"));
        assert!(!wrapped.contains("uniform vec2 iResolution"));
        assert!(!wrapped.contains("precision mediump"));
        assert_eq!(wrapped.matches("#version").count(), 1);
        assert!(wrapped.contains("mainImage"));
    }

    #[test]
    fn wrap_declares_the_frame_block_once() {
        let wrapped = wrap_fragment("void mainImage(out vec4 o, in vec2 fc) { o = vec4(1.0); }");
        assert_eq!(wrapped.matches("FrameUniforms").count(), 1);
        assert!(wrapped.starts_with("#version 450"));
        assert!(wrapped.ends_with("}\n"));
    }
}
