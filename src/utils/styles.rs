//! Used to color and otherwise style various bits of output using a
//! ~/.dsosyms/styles.tcss file.
use std::fs::OpenOptions;
use std::io;
use std::io::prelude::*;
use std::path::Path;
use std::sync::LazyLock;
use std::{fs, path::PathBuf};
use termio::prelude::*;
use termio::{StyledString, Termio};

/// Directory under home used for styles and REPL history.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|mut path| {
        path.push(".dsosyms");
        path
    })
}

/// Create the style file if it is missing.
pub fn generate_style_file() {
    if let Some(mut path) = config_dir() {
        if make_dir(&path) {
            path.push("styles.tcss");
            default_styles(path);
        }
    } else {
        println!("couldn't find home directory"); // don't use warn() here
    }
}

pub trait Styling {
    fn explain_title(self) -> StyledString;
    fn explain_text(self) -> StyledString;
    fn address(self) -> StyledString;
    fn symbol_name(self) -> StyledString;
    fn table_header(self) -> StyledString;
    fn table_sep(self) -> StyledString;
    fn table_field(self) -> StyledString;
    fn warn(self) -> StyledString;
}

impl Styling for String {
    fn explain_title(self) -> StyledString {
        self.style("explain title", &TCSS)
    }

    fn explain_text(self) -> StyledString {
        self.style("explain text", &TCSS)
    }

    fn address(self) -> StyledString {
        self.style("address", &TCSS)
    }

    fn symbol_name(self) -> StyledString {
        self.style("symbol name", &TCSS)
    }

    fn table_header(self) -> StyledString {
        self.style("table header", &TCSS)
    }

    fn table_sep(self) -> StyledString {
        self.style("table separator", &TCSS)
    }

    fn table_field(self) -> StyledString {
        self.style("table field", &TCSS)
    }

    fn warn(self) -> StyledString {
        self.style("warn", &TCSS)
    }
}

impl Styling for &str {
    fn explain_title(self) -> StyledString {
        self.style("explain title", &TCSS)
    }

    fn explain_text(self) -> StyledString {
        self.style("explain text", &TCSS)
    }

    fn address(self) -> StyledString {
        self.style("address", &TCSS)
    }

    fn symbol_name(self) -> StyledString {
        self.style("symbol name", &TCSS)
    }

    fn table_header(self) -> StyledString {
        self.style("table header", &TCSS)
    }

    fn table_sep(self) -> StyledString {
        self.style("table separator", &TCSS)
    }

    fn table_field(self) -> StyledString {
        self.style("table field", &TCSS)
    }

    fn warn(self) -> StyledString {
        self.style("warn", &TCSS)
    }
}

static TCSS: LazyLock<Termio> = LazyLock::new(|| {
    let Some(mut path) = config_dir() else {
        return Termio::new(); // we'll have complained about this already
    };
    path.push("styles.tcss");
    if !path.exists() {
        // Library users never call generate_style_file so this is the normal case for them.
        return Termio::new();
    }
    match path.into_os_string().into_string() {
        Ok(os_path) => match Termio::from_file(&os_path) {
            Ok(tcss) => tcss,
            Err(err) => {
                eprintln!("couldn't parse file at {os_path}: {err}"); // don't use warn() here
                Termio::new()
            }
        },
        Err(_) => Termio::new(),
    }
});

fn make_dir(path: &Path) -> bool {
    match fs::create_dir(path) {
        Ok(_) => true,
        Err(err) => match err.kind() {
            io::ErrorKind::AlreadyExists => true,
            _ => {
                println!("couldn't create path for {}: {err}", path.display()); // don't use warn() here
                false
            }
        },
    }
}

fn default_styles(path: PathBuf) {
    match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path.clone())
    {
        Ok(mut file) => {
            let defaults = include_str!("default.tcss");
            if let Err(err) = file.write_all(defaults.as_bytes()) {
                println!("error writing defaults to {}: {err}", path.display());
            }
        }
        Err(err) => match err.kind() {
            io::ErrorKind::AlreadyExists => (), // user already has a styles file
            _ => println!("error creating {}: {err}", path.display()), // don't use warn() here
        },
    }
}
