// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

/// Returns the trimmed input, or `None` when nothing but whitespace remains.
/// A `None` is what makes the coordinator skip a submission without sending
/// any request.
pub fn normalized_required(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_owned())
}
