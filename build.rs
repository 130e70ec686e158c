use vergen::*;

fn main() {
    let flags = ConstantsFlags::all();
    if let Err(e) = gen(flags) {
        println!("cargo:warning=unable to generate the cargo keys: {}", e);
    }

    let mut features = vec![];
    for (k, _v) in std::env::vars() {
        match k.as_str() {
            "CARGO_FEATURE_HDF5_OUTPUT" => features.push("hdf5-output"),
            _ => {}
        }
    }
    let features = features.join(",");
    println!("cargo:rustc-env=FERMIGEN_ACTIVE_FEATURES={}", features);
}
