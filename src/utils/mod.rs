pub(crate) mod git;

pub(crate) use git::collect_git_metadata;
