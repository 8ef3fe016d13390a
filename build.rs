use shadow_rs::ShadowBuilder;

fn main() {
    // Build metadata consumed by `--version` and the health endpoint
    ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");

    println!("cargo:rerun-if-changed=migrations");
}
