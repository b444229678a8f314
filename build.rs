use std::path::Path;

fn main() {
    let signatures_path = Path::new("signatures/default.json");
    validate_signature_file(signatures_path);
    set_build_dependencies();
}

fn validate_signature_file(signatures_path: &Path) {
    // Ensure the embedded signature set exists at build time
    assert!(
        signatures_path.exists(),
        "\n\nSIGNATURE BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the signature file before building.\n",
        signatures_path.display()
    );

    let contents = std::fs::read_to_string(signatures_path).unwrap_or_else(|e| {
        panic!(
            "\n\nSIGNATURE BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            signatures_path.display()
        );
    });

    let set: serde_json::Value = serde_json::from_str(&contents).unwrap_or_else(|e| {
        panic!(
            "\n\nSIGNATURE BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            signatures_path.display()
        );
    });

    validate_set_structure(&set);
}

fn validate_set_structure(set: &serde_json::Value) {
    assert!(
        set.is_object(),
        "\n\nSIGNATURE BUILD ERROR: Root must be a JSON object\n\
         Got: {set}\n"
    );

    let signatures = set.get("signatures").unwrap_or_else(|| {
        panic!(
            "\n\nSIGNATURE BUILD ERROR: Missing 'signatures' field\n\
             The signature set must have a top-level 'signatures' array.\n"
        );
    });

    let sigs = signatures.as_array().unwrap_or_else(|| {
        panic!(
            "\n\nSIGNATURE BUILD ERROR: 'signatures' must be an array\n\
             Got: {signatures}\n"
        );
    });

    let total_segments = validate_signatures(sigs);

    println!(
        "cargo:warning=Validated signature set: {} signatures, {total_segments} total segments",
        sigs.len()
    );
}

fn validate_signatures(sigs: &[serde_json::Value]) -> usize {
    let mut total_segments = 0;

    for (i, signature) in sigs.iter().enumerate() {
        let sig_id = signature
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or("<unknown>");

        validate_signature_fields(signature, sig_id, i);
        total_segments += validate_signature_segments(signature, sig_id);
    }

    total_segments
}

fn validate_signature_fields(signature: &serde_json::Value, sig_id: &str, index: usize) {
    assert!(
        signature.get("id").is_some(),
        "\n\nSIGNATURE BUILD ERROR: Signature at index {index} missing 'id' field\n"
    );
    assert!(
        signature.get("name").is_some(),
        "\n\nSIGNATURE BUILD ERROR: Signature '{sig_id}' (index {index}) missing 'name' field\n"
    );
    assert!(
        signature.get("segments").is_some(),
        "\n\nSIGNATURE BUILD ERROR: Signature '{sig_id}' (index {index}) missing 'segments' field\n"
    );
}

fn validate_signature_segments(signature: &serde_json::Value, sig_id: &str) -> usize {
    let Some(segments) = signature.get("segments").and_then(|s| s.as_array()) else {
        return 0;
    };
    assert!(
        !segments.is_empty(),
        "\n\nSIGNATURE BUILD ERROR: Signature '{sig_id}' has no segments\n"
    );
    for (j, segment) in segments.iter().enumerate() {
        let frames = segment
            .get("frames")
            .and_then(|f| f.as_array())
            .unwrap_or_else(|| {
                panic!(
                    "\n\nSIGNATURE BUILD ERROR: Signature '{sig_id}' segment {j} missing 'frames' array\n"
                );
            });
        assert!(
            !frames.is_empty(),
            "\n\nSIGNATURE BUILD ERROR: Signature '{sig_id}' segment {j} has no frames\n"
        );
        for (k, frame) in frames.iter().enumerate() {
            validate_frame(frame, sig_id, j, k);
        }
    }
    segments.len()
}

fn validate_frame(frame: &serde_json::Value, sig_id: &str, segment: usize, index: usize) {
    if let Some(bytes) = frame.get("bytes") {
        validate_hex(bytes, sig_id, segment, index);
    } else if let Some(options) = frame.get("choice") {
        let options = options.as_array().unwrap_or_else(|| {
            panic!(
                "\n\nSIGNATURE BUILD ERROR: Signature '{sig_id}' segment {segment} frame {index}: 'choice' must be an array\n"
            );
        });
        assert!(
            !options.is_empty(),
            "\n\nSIGNATURE BUILD ERROR: Signature '{sig_id}' segment {segment} frame {index}: empty choice\n"
        );
        for option in options {
            validate_hex(option, sig_id, segment, index);
        }
    } else {
        assert!(
            frame.get("any").is_some(),
            "\n\nSIGNATURE BUILD ERROR: Signature '{sig_id}' segment {segment} frame {index}: \
             expected one of 'bytes', 'any' or 'choice'\n"
        );
    }
}

fn validate_hex(value: &serde_json::Value, sig_id: &str, segment: usize, index: usize) {
    let hex = value.as_str().unwrap_or("");
    assert!(
        !hex.is_empty() && hex.len() % 2 == 0 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        "\n\nSIGNATURE BUILD ERROR: Signature '{sig_id}' segment {segment} frame {index}: \
         invalid hex string {value}\n"
    );
}

fn set_build_dependencies() {
    // Tell cargo to rerun if the signature set changes
    println!("cargo:rerun-if-changed=signatures/default.json");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
