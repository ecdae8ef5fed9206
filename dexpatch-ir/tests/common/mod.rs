#![allow(dead_code)]

use dexpatch_ir::*;

/// A small two-class listing: one method reading the mock flag, one
/// abstract method, one static helper with a switch.
pub const TRACKER: &str = r#"
classes:
  - name: Lcom/example/Tracker;
    methods:
      - name: isFake
        parameters: [Landroid/location/Location;]
        return_type: Z
        access_flags: [public]
        registers: 2
        code:
          - invoke-virtual {v1}, Landroid/location/Location;->isMock()Z
          - move-result v0
          - if-eqz v0, :real
          - const/4 v0, 0x1
          - return v0
          - ":real"
          - const/4 v0, 0x0
          - return v0
      - name: report
        parameters: [Ljava/lang/String;]
        access_flags: [public, abstract]
  - name: Lcom/example/Util;
    methods:
      - name: pick
        parameters: [I]
        return_type: I
        access_flags: [public, static]
        registers: 2
        code:
          - packed-switch v1, :table
          - const/4 v0, -0x1
          - return v0
          - ":one"
          - const/4 v0, 0x1
          - return v0
          - ":table"
          - ".packed-switch 0x0 {:one, :one}"
"#;

pub fn tracker_image() -> DexImage {
    Listing::from_yaml(TRACKER).unwrap().to_image().unwrap()
}

pub fn is_mock() -> MethodReference {
    MethodReference::new("Landroid/location/Location;", "isMock", Vec::<String>::new(), "Z")
}

/// Lines as a `Vec<String>` for [`assemble_method`].
pub fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}
