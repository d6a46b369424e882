// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use similar_asserts::assert_eq;

#[test]
fn builds_in_fixed_order() {
    let script = ScriptBuilder::new()
        .comment("Autogenerated by cmdq")
        .export("DATA_DIR", "/data/in dir")
        .mkdir("/s/sess/job_info")
        .header_command("source .venv/bin/activate")
        .section("echo one")
        .section("echo two")
        .build();

    assert_eq!(
        script,
        "\
#!/bin/bash
# Autogenerated by cmdq
export DATA_DIR='/data/in dir'
mkdir -p /s/sess/job_info
source .venv/bin/activate

echo one

echo two
"
    );
}

#[test]
fn shebang_is_configurable() {
    let script = ScriptBuilder::new().shebang("#!/usr/bin/env bash").build();
    assert!(script.starts_with("#!/usr/bin/env bash\n"));
}

#[test]
fn empty_builder_is_just_a_shebang() {
    assert_eq!(ScriptBuilder::new().build(), "#!/bin/bash\n");
}
