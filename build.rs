fn main() {
    // Re-run if git HEAD changes so the embedded hash tracks the checkout.
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let hash = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_default();
    let tag = git(&["describe", "--exact-match", "--tags", "HEAD"]).unwrap_or_default();

    println!("cargo:rustc-env=GRAYFLOW_GIT_HASH={hash}");
    println!("cargo:rustc-env=GRAYFLOW_RELEASE_TAG={tag}");
}

fn git(args: &[&str]) -> Option<String> {
    std::process::Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}
