fn main() {
    // The packaged backend is bundled as a resource; rebuild when it changes
    println!("cargo:rerun-if-changed=../target/release/chronocop-server");

    tauri_build::build();
}
