//! Stage registry listing: `pipeline stages`.

pub fn cmd_stages() {
    println!();
    print!("{}", pipeline::ui::render_stages());
    println!();
}
