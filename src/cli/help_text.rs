pub(super) const ROOT_LONG_ABOUT: &str = "\
Snapshot and validate checksums of a file tree

Treeseal records a SHA-256 checksum for every regular file beneath a root
directory and later re-checks the tree against that record. Use it to detect
silent corruption or unexpected modification of archives and backups.

The record (the manifest) is a zstd-compressed list of relative paths and
checksums stored in .treeseal/manifest directly under the root. The .treeseal
directory is created on first use and is never itself checksummed.

MODES:

  init
    Walk the tree and write the manifest. Fails if the tree already has one;
    use reset first to start over. The manifest is written to a temporary file
    and only moved into place once every file has been checksummed, so a
    failed init never leaves a partial manifest behind.

  validate
    Re-checksum every file named in the manifest, in manifest order. Stops at
    the first file that is missing or whose checksum differs. Files added to
    the tree after init are not reported.

  reset
    Delete the .treeseal directory. Succeeds even if there is nothing to
    delete; removal errors are logged and ignored unless --strict is given.";

pub(super) const ROOT_AFTER_LONG_HELP: &str = "\
EXAMPLES:

  $ treeseal -d /srv/archive -m init
  $ treeseal -d /srv/archive -m validate
  $ TREESEAL_DIRECTORY=/srv/archive TREESEAL_MODE=reset treeseal

EXIT CODES:

  0    Success
  1    Validation failed: a recorded file is missing or has changed
  2    Invalid arguments
  255  Any other error (I/O errors, not initialized, already initialized, ...)

LOGGING:

  Progress is logged to stderr at info level. RUST_LOG is honoured, -v and -vv
  raise the level to debug and trace, and --log-level overrides all of them.";
