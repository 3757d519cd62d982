use shadow_rs::ShadowBuilder;

fn main() {
    // Embed git and build metadata used by `herald-rs --version`
    ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");
}
