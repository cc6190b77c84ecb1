#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::parse_from(["vedit", "serve"]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.host, None);
        assert_eq!(args.port, None);
        assert_eq!(args.api_key, None);
        assert!(!args.no_git);
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::parse_from([
            "vedit", "serve", "--host", "0.0.0.0", "-p", "8080", "--api-key", "s3cret", "--no-git",
        ]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.api_key.as_deref(), Some("s3cret"));
        assert!(args.no_git);
    }

    #[test]
    fn test_annotate_requires_paths() {
        assert!(Cli::try_parse_from(["vedit", "annotate"]).is_err());

        let cli = Cli::parse_from(["vedit", "annotate", "src", "src/App.jsx", "--write", "--eager-index"]);
        let Command::Annotate(args) = cli.command else {
            panic!("expected annotate");
        };
        assert_eq!(args.paths, vec![PathBuf::from("src"), PathBuf::from("src/App.jsx")]);
        assert!(args.write);
        assert!(args.eager_index);
    }

    #[test]
    fn test_inspect_line_filter() {
        let cli = Cli::parse_from(["vedit", "inspect", "src/App.jsx", "--line", "12"]);
        let Command::Inspect(args) = cli.command else {
            panic!("expected inspect");
        };
        assert_eq!(args.file, PathBuf::from("src/App.jsx"));
        assert_eq!(args.line, Some(12));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "vedit", "inspect", "App.jsx", "--root", "/app", "--config", "/app/vedit.toml", "-v",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.project.root, Some(PathBuf::from("/app")));
        assert_eq!(cli.project.config, Some(PathBuf::from("/app/vedit.toml")));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["vedit", "-v", "-q", "serve"]).is_err());
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Cli::try_parse_from(["vedit", "serve", "--port", "70000"]).is_err());
    }
}
