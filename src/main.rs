#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("`jsonsieve` CLI is only available with the `cli` feature");
    std::process::exit(2);
}

#[cfg(feature = "cli")]
fn main() {
    use jsonsieve::{
        meta_schema, validate_str, CompileOptions, Locale, Problem, Schema,
    };
    use std::{fs, path::PathBuf, process, sync::Arc};
    use structopt::clap::AppSettings;
    use structopt::StructOpt;

    #[derive(StructOpt)]
    #[structopt(
        name = "jsonsieve",
        about = "Streaming JSON Schema (Draft-07) validation",
        setting = AppSettings::DisableVersion
    )]
    struct Cli {
        /// Treat unknown format attributes as schema errors.
        #[structopt(short = "r", long = "strict-format")]
        strict_format: bool,

        /// Message locale (e.g. `en`, `ja`); defaults to the environment.
        #[structopt(short = "l", long = "locale")]
        locale: Option<String>,

        /// Show program's version number and exit.
        #[structopt(short = "v", long = "version")]
        version: bool,

        /// The JSON schema to validate with. With no instances, the schema
        /// itself is validated against the Draft-07 meta-schema.
        #[structopt(required_unless = "version")]
        schema: Option<PathBuf>,

        /// JSON instances to validate against the schema.
        instances: Vec<PathBuf>,
    }

    fn read_file(path: &PathBuf) -> String {
        match fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) => {
                eprintln!("{}: {}", path.display(), error);
                process::exit(2);
            }
        }
    }

    fn print_problems(name: &str, problems: &[Problem], locale: Locale) {
        println!("{} - INVALID", name);
        for problem in problems {
            for line in problem.to_display_lines(locale) {
                println!("{}", line);
            }
        }
    }

    let cli = match Cli::from_iter_safe(std::env::args()) {
        Ok(cli) => cli,
        Err(error) => {
            if error.use_stderr() {
                eprintln!("{}", error.message);
                process::exit(2);
            }
            // --help and friends.
            println!("{}", error.message);
            process::exit(0);
        }
    };

    if cli.version {
        println!(concat!("jsonsieve ", env!("CARGO_PKG_VERSION")));
        return;
    }

    let locale = cli
        .locale
        .as_deref()
        .and_then(Locale::from_tag)
        .unwrap_or_default();

    let schema_path = cli.schema.expect("clap enforces the schema argument");
    let schema_text = read_file(&schema_path);
    let schema_name = schema_path.to_string_lossy();

    // The schema document is itself an instance of the meta-schema.
    let meta_problems = match validate_str(meta_schema(), &schema_text) {
        Ok(problems) => problems,
        Err(error) => {
            eprintln!("{}: {}", schema_name, error);
            process::exit(2);
        }
    };

    let mut success = true;
    if !meta_problems.is_empty() {
        success = false;
        print_problems(&schema_name, &meta_problems, locale);
    } else if cli.instances.is_empty() {
        println!("{} - VALID", schema_name);
    }

    if !cli.instances.is_empty() {
        let document: serde_json::Value = match serde_json::from_str(&schema_text) {
            Ok(document) => document,
            Err(error) => {
                eprintln!("{}: {}", schema_name, error);
                process::exit(2);
            }
        };
        let schema: Arc<Schema> = match CompileOptions::default()
            .strict_formats(cli.strict_format)
            .compile(&document)
        {
            Ok(schema) => schema,
            Err(error) => {
                println!("{} - INVALID: {}", schema_name, error);
                process::exit(1);
            }
        };
        for instance in &cli.instances {
            let text = read_file(instance);
            let name = instance.to_string_lossy();
            match validate_str(&schema, &text) {
                Ok(problems) if problems.is_empty() => println!("{} - VALID", name),
                Ok(problems) => {
                    success = false;
                    print_problems(&name, &problems, locale);
                }
                Err(error) => {
                    eprintln!("{}: {}", name, error);
                    process::exit(2);
                }
            }
        }
    }

    if !success {
        process::exit(1);
    }
}
