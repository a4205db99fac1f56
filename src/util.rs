// Copyright (c) 2017-2021 Fabian Schuiki

//! Various utility functions that fit nowhere else.

/// Join the items of an iterator into a formatter, separated by `sep`.
pub fn write_implode<T, I>(
    f: &mut std::fmt::Formatter,
    sep: &str,
    mut it: I,
) -> std::fmt::Result
where
    T: std::fmt::Display,
    I: Iterator<Item = T>,
{
    if let Some(first) = it.next() {
        write!(f, "{}", first)?;
        for item in it {
            write!(f, "{}{}", sep, item)?;
        }
    }
    Ok(())
}
