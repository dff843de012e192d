use std::{env, io};
use uri_parts::{
    parse::{Generic, Strict},
    ParseError, Uri,
};

fn main() {
    let lines = uri_parts::lines(io::stdin().lock());
    let strict = env::args().any(|arg| arg == "--strict");

    let print = |res: io::Result<Result<Uri<String>, ParseError<String>>>| {
        match res.expect("failed to read line") {
            Ok(uri) => {
                let c = uri.components();
                println!("{uri}");
                println!("{c:#?}");
                if let Some(auth) = c.authority() {
                    println!("idn host: {}", auth.host().idn());
                    println!("unicode host: {}", auth.host().to_unicode());
                }
                match uri.query_map() {
                    Ok(map) => println!("query: {map:?}"),
                    Err(e) => println!("query: {e}"),
                }
            }
            Err(e) => println!("Error: {e}"),
        }
    };

    if strict {
        lines.with_parser(Strict).for_each(print);
    } else {
        lines.with_parser(Generic).for_each(print);
    }
}
