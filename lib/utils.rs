//! Miscellaneous I/O helpers for executables.

/// Create a directory and all missing parents, panicking on failure.
#[macro_export]
macro_rules! mkdir {
    ( $dir:expr ) => {
        match std::fs::create_dir_all(&$dir) {
            Ok(_) => { },
            Err(err) => {
                panic!("couldn't create directory {:?}: {}", $dir, err)
            },
        }
    }
}

/// Write arrays to an `.npz` archive, panicking on failure.
#[macro_export]
macro_rules! write_npz {
    ( $path:expr, arrays: { $( $name:expr => $arr:expr ),* $(,)? } ) => {
        {
            let file = match std::fs::File::create(&$path) {
                Ok(f) => f,
                Err(err) => {
                    panic!("couldn't create file {:?}: {}", $path, err)
                },
            };
            let mut npz = ndarray_npy::NpzWriter::new(file);
            $(
                match npz.add_array($name, $arr) {
                    Ok(_) => { },
                    Err(err) => {
                        panic!("error writing array '{}': {}", $name, err)
                    },
                }
            )*
            match npz.finish() {
                Ok(_) => { },
                Err(err) => {
                    panic!("error finalizing file {:?}: {}", $path, err)
                },
            }
        }
    }
}

/// `print!` followed by an explicit flush of stdout.
#[macro_export]
macro_rules! print_flush {
    ( $( $arg:tt )* ) => {
        {
            use std::io::Write;
            print!($( $arg )*);
            let _ = std::io::stdout().flush();
        }
    }
}

/// `println!` followed by an explicit flush of stdout.
#[macro_export]
macro_rules! println_flush {
    ( $( $arg:tt )* ) => {
        {
            use std::io::Write;
            println!($( $arg )*);
            let _ = std::io::stdout().flush();
        }
    }
}
