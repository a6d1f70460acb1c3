/// Delegates to nih_plug_xtask for the `bundle` subcommand:
///
///   cargo xtask bundle loveless-cascade --release
///
/// This compiles the plugin as a cdylib and packages it into
/// `target/bundled/Loveless Cascade.vst3` and `.clap`.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
