use crate::project::ProjectContext;

pub async fn run(dev: bool, ctx: ProjectContext) -> anyhow::Result<()> {
    let wasm_pack = which::which("wasm-pack").map_err(|_| {
        anyhow::anyhow!("wasm-pack not found on PATH. Install it with `cargo install wasm-pack`.")
    })?;

    log::info!("{:?} project at {}", ctx.kind, ctx.project_root.display());
    let args = wasm_pack_args(&ctx.config.out_dir, dev);
    println!(
        "Building {} with {}...",
        ctx.web_crate_path.display(),
        wasm_pack.display()
    );
    log::debug!("wasm-pack {}", args.join(" "));

    let status = tokio::process::Command::new(&wasm_pack)
        .args(&args)
        .current_dir(&ctx.web_crate_path)
        .stdin(std::process::Stdio::inherit())
        .stdout(std::process::Stdio::inherit())
        .stderr(std::process::Stdio::inherit())
        .status()
        .await?;

    if !status.success() {
        anyhow::bail!("wasm-pack exited with {status}");
    }
    println!(
        "Bundle written to {}",
        ctx.web_crate_path.join(&ctx.config.out_dir).display()
    );
    Ok(())
}

pub fn wasm_pack_args(out_dir: &str, dev: bool) -> Vec<String> {
    let profile = if dev { "--dev" } else { "--release" };
    ["build", "--target", "web", "--out-dir", out_dir, profile]
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_args() {
        assert_eq!(
            wasm_pack_args("pkg", false),
            vec!["build", "--target", "web", "--out-dir", "pkg", "--release"]
        );
    }

    #[test]
    fn test_dev_args() {
        let args = wasm_pack_args("dist/wasm", true);
        assert_eq!(args.last().map(String::as_str), Some("--dev"));
        assert!(args.contains(&"dist/wasm".to_string()));
    }
}
