// Logical id derivation
//
// A resource's logical id is built from its construct path: every segment
// is split on non-alphanumeric characters and each word is capitalised.
// `Resource` and `Default` segments are dropped so a higher-level construct
// and its default child share the readable name.

const HIDDEN_SEGMENTS: [&str; 2] = ["Resource", "Default"];

pub fn logical_id(path: &[&str]) -> String {
    let mut id = String::new();
    for segment in path
        .iter()
        .filter(|segment| !HIDDEN_SEGMENTS.contains(segment))
    {
        for word in segment.split(|c: char| !c.is_ascii_alphanumeric()) {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                id.push(first.to_ascii_uppercase());
                id.extend(chars);
            }
        }
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_id_pascalizes_segments() {
        assert_eq!(logical_id(&["fn-role-discord-pong"]), "FnRoleDiscordPong");
        assert_eq!(
            logical_id(&["fn-role-return-200", "DefaultPolicy"]),
            "FnRoleReturn200DefaultPolicy"
        );
    }

    #[test]
    fn test_logical_id_drops_resource_segment() {
        assert_eq!(
            logical_id(&["fn-return-200", "Resource"]),
            logical_id(&["fn-return-200"])
        );
    }

    #[test]
    fn test_logical_id_keeps_inner_case() {
        assert_eq!(logical_id(&["fn-param-x-DB-USER"]), "FnParamXDBUSER");
    }
}
