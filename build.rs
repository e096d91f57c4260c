fn main() {
    println!("cargo::rerun-if-changed=schemas/library.graphql");

    cynic_codegen::register_schema("library")
        .from_sdl_file("schemas/library.graphql")
        .expect("schemas/library.graphql is readable")
        .as_default()
        .expect("library schema registers as the default");
}
