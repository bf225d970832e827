//! Integration tests: loading, matching, mutation and trace shapes

use gatehouse_rules::{load, EvalError, Rules};

fn trace(rules: &Rules, action: &str) -> String {
    rules.evaluate(action).unwrap().to_string()
}

#[test]
fn load_and_match_rules() {
    let rules = load(
        r"
        admin:
          posts: [new, create, destroy]
          comments: destroy
          users: '*'
        super: '*'
        ",
    )
    .unwrap();

    assert_eq!(trace(&rules, "admin:comments:destroy"), "[admin, comments, destroy, match]");
    assert_eq!(trace(&rules, "admin:comments:create"), "[admin, comments, destroy, mismatch]");
    assert_eq!(trace(&rules, "admin:users:new"), "[admin, users, *, match]");
    assert_eq!(trace(&rules, "admin:comments"), "[admin, comments, match]");
    assert_eq!(trace(&rules, "admin:posts"), "[admin, posts, match]");
    assert_eq!(trace(&rules, "admin:posts:create"), "[admin, posts, create, match]");
    assert_eq!(
        trace(&rules, "admin:posts:update"),
        "[admin, posts, [new, create, destroy], mismatch]"
    );

    // a non-wildcard leaf never matches more than one remaining token
    assert_eq!(
        trace(&rules, "admin:comments:destroy:confirm"),
        "[admin, comments, destroy, mismatch]"
    );

    assert_eq!(trace(&rules, "admin:products"), "[admin, products, mismatch]");
    assert_eq!(trace(&rules, "admin:products:new"), "[admin, products, mismatch]");
    assert_eq!(trace(&rules, "user"), "[user, mismatch]");

    assert_eq!(trace(&rules, "admin:users"), "[admin, users, match]");
    assert_eq!(trace(&rules, "super"), "[super, match]");
    assert_eq!(trace(&rules, "super:users"), "[super, *, match]");
    assert_eq!(trace(&rules, "super:users:new:confirm"), "[super, *, match]");
}

#[test]
fn matches_is_the_boolean_view_of_evaluate() {
    let rules = load(
        r"
        admin:
          posts: [new, create, destroy]
          comments: destroy
          users: '*'
        super: '*'
        ",
    )
    .unwrap();

    assert!(rules.matches("admin:comments:destroy").unwrap());
    assert!(!rules.matches("admin:comments:new").unwrap());
    assert!(rules.matches("admin:users:anything").unwrap());
    assert!(!rules.matches("admin:posts:update").unwrap());

    for action in ["admin:posts:new", "admin:products", "super:anything:at:all"] {
        assert_eq!(
            rules.matches(action).unwrap(),
            rules.evaluate(action).unwrap().is_match()
        );
    }
}

#[test]
fn wildcard_tokens_are_rejected_in_actions() {
    let rules = load("super: '*'\n").unwrap();

    assert!(matches!(
        rules.evaluate("super:*"),
        Err(EvalError::InvalidAction(token)) if token == "*"
    ));
    assert!(matches!(
        rules.matches("admin:*:destroy"),
        Err(EvalError::InvalidAction(_))
    ));
}

#[test]
fn union_groups_by_root_group_name() {
    let rules = load(
        r"
        role1:
          posts: [new, create, destroy]
        role2:
          comments: destroy
          users: '*'
        admin: role1 + role2
        ",
    )
    .unwrap();

    // a right-hand success keeps the left trace as the explanation
    assert_eq!(
        trace(&rules, "admin:comments:destroy"),
        "[admin, role1 + role2, [role1, comments, mismatch], match]"
    );
    assert_eq!(
        trace(&rules, "admin:users:new"),
        "[admin, role1 + role2, [role1, users, mismatch], match]"
    );
    assert_eq!(
        trace(&rules, "admin:posts:new"),
        "[admin, role1 + role2, [role1, posts, new, match], match]"
    );
}

#[test]
fn union_group_that_does_not_exist() {
    let rules = load(
        r"
        role1:
          posts: [new, create, destroy]
        admin1: role1 + role2
        admin2: role1 - role2
        ",
    )
    .unwrap();

    for action in [
        "admin1:posts:destroy",
        "admin1:users:new",
        "admin2:posts:destroy",
        "admin2:users:new",
    ] {
        match rules.evaluate(action) {
            Err(EvalError::UnknownGroup { name, known }) => {
                assert_eq!(name, "role2");
                assert_eq!(known, ["admin1", "admin2", "role1"]);
            }
            other => panic!("expected UnknownGroup for {action}, got {other:?}"),
        }
    }
}

#[test]
fn group_subtraction() {
    let rules = load(
        r"
        super: '*'
        role1:
          posts: [new, create, destroy]
          comments: destroy
        role2:
          posts: [new, destroy]
          users: '*'
        admin: role1 - role2
        admin2: super - role1
        ",
    )
    .unwrap();

    // a successful subtraction shows why the exclusion did not apply
    assert_eq!(
        trace(&rules, "admin:posts:create"),
        "[admin, role1 - role2, [role2, posts, [new, destroy], mismatch], match]"
    );
    assert_eq!(
        trace(&rules, "admin:comments:destroy"),
        "[admin, role1 - role2, [role2, comments, mismatch], match]"
    );

    // a voided grant keeps both sides for diagnosis
    assert_eq!(
        trace(&rules, "admin:posts:destroy"),
        "[admin, role1 - role2, [role1, posts, destroy, match], [role2, posts, destroy, match], mismatch]"
    );
    assert_eq!(
        trace(&rules, "admin:users:new"),
        "[admin, role1 - role2, [role1, users, mismatch], mismatch]"
    );

    assert_eq!(
        trace(&rules, "admin2:posts:index"),
        "[admin2, super - role1, [role1, posts, [new, create, destroy], mismatch], match]"
    );
    assert_eq!(
        trace(&rules, "admin2:posts:create"),
        "[admin2, super - role1, [super, *, match], [role1, posts, create, match], mismatch]"
    );
}

#[test]
fn combination_of_group_union_and_subtraction() {
    let rules = load(
        r"
        role1:
          posts: [new, create, destroy]
          comments: destroy
        role2:
          posts: [new, destroy]
          users: '*'
        role3:
          posts: [new]
          users: [new]
        admin: role1 - role2
        super: role1 - role2 + role3
        ",
    )
    .unwrap();

    assert!(!rules.matches("admin:posts:new").unwrap());
    assert!(rules.matches("super:posts:new").unwrap());
    assert!(!rules.matches("admin:users:new").unwrap());
    assert!(rules.matches("super:users:new").unwrap());

    // `a - b + c` evaluates as `(a - b) + c`
    assert_eq!(
        trace(&rules, "super:posts:new"),
        "[super, role1 - role2 + role3, [[role1, posts, new, match], [role2, posts, new, match], mismatch], match]"
    );
}

#[test]
fn multiple_levels_of_group_reference() {
    let rules = load(
        r"
        role1:
          posts: [new, create, destroy]
          comments: destroy
        role2:
          posts: [new, destroy]
          users: '*'
          comments: new
        role3:
          posts: [new]
          users: [new]
          comments: new
        role4: role2 - role3
        admin: role1 + role4
        ",
    )
    .unwrap();

    assert!(rules.matches("admin:posts:destroy").unwrap());
    assert!(rules.matches("admin:users:destroy").unwrap());
    assert!(rules.matches("admin:comments:destroy").unwrap());
    assert!(rules.matches("admin:posts:new").unwrap());

    // admin = role1 + (role4 = role2 - role3); users:new survives role2 but
    // is subtracted by role3 and never granted by role1
    assert_eq!(
        trace(&rules, "admin:users:new"),
        "[admin, role1 + role4, [role1, users, mismatch], \
         [role4, role2 - role3, [role2, users, *, match], [role3, users, new, match], mismatch], \
         mismatch]"
    );
    assert_eq!(
        trace(&rules, "admin:users:destroy"),
        "[admin, role1 + role4, [role1, users, mismatch], match]"
    );
}

#[test]
fn alias_root_group_name() {
    let rules = load(
        r"
        role1:
          posts: [new, create, destroy]
          comments: destroy
        role2: role1
        ",
    )
    .unwrap();

    assert_eq!(trace(&rules, "role1:posts:new"), "[role1, posts, new, match]");
    assert_eq!(
        trace(&rules, "role2:posts:new"),
        "[role2, role1, role1, posts, new, match]"
    );
}

#[test]
fn duplicated_group_names_resolve_by_position() {
    let rules = load(
        r"
        role1:
          posts: [new, create, destroy]
          comments: destroy
        posts: role1
        comments:
          posts: [new]
        ",
    )
    .unwrap();

    assert_eq!(trace(&rules, "role1:posts:new"), "[role1, posts, new, match]");
    assert_eq!(
        trace(&rules, "posts:posts:new"),
        "[posts, role1, role1, posts, new, match]"
    );
    assert_eq!(trace(&rules, "comments:posts:new"), "[comments, posts, new, match]");
    assert_eq!(
        trace(&rules, "comments:posts:create"),
        "[comments, posts, [new], mismatch]"
    );
}

#[test]
fn combination_of_subtraction_and_wildcard() {
    let rules = load(
        r"
        role1:
          posts: [new, create, destroy]
          comments: destroy
        role2:
          posts: [new, destroy]
          users: '*'
        role3:
          posts: [new]
          users: [new]
        admin: '* - role1'
        super: '* - role2 + role3'
        ",
    )
    .unwrap();

    assert!(!rules.matches("admin:posts:new").unwrap());
    assert_eq!(
        trace(&rules, "admin:users:new"),
        "[admin, * - role1, [role1, users, mismatch], match]"
    );

    assert!(rules.matches("super:posts:new").unwrap());
    assert!(rules.matches("super:users:new").unwrap());
    assert_eq!(
        trace(&rules, "super:posts:destroy"),
        "[super, * - role2 + role3, [[match], [role2, posts, destroy, match], mismatch], \
         [role3, posts, [new], mismatch], mismatch]"
    );
    assert!(!rules.matches("super:users:create").unwrap());
}

#[test]
fn append_rules() {
    let mut rules = Rules::new();
    rules.add("admin:posts:new,create,destroy");
    rules.add("admin: comments: [new,destroy]");
    rules.add("admin:users:*");
    rules.add("super:users:*");
    rules.add("hero: admin - super");
    rules.add("hello:*");

    assert!(rules.matches("admin:users:new").unwrap());
    assert!(rules.matches("admin:posts:new").unwrap());
    assert!(rules.matches("admin:comments:new").unwrap());
    assert!(!rules.matches("admin:posts:update").unwrap());
    assert!(rules.matches("super:users:new").unwrap());

    assert!(rules.matches("hero:posts:new").unwrap());
    assert!(!rules.matches("hero:users:new").unwrap());

    assert!(rules.matches("hello:world").unwrap());
}

#[test]
fn dequote_action_format_rules() {
    let mut rules = Rules::new();
    rules.add("admin:posts:\"*\"");
    rules.add("admin:users:'*'");
    rules.add("admin:comments:[*]");

    assert!(rules.matches("admin:posts:new").unwrap());
    assert!(rules.matches("admin:users:new").unwrap());
    assert!(rules.matches("admin:comments:new").unwrap());
}

#[test]
fn match_with_structured_action_parts() {
    let mut rules = Rules::new();
    rules.add("admin:posts:*");

    assert!(rules.matches(("admin", "posts", "new")).unwrap());
    assert!(rules.matches(("admin", "posts:new")).unwrap());
    assert!(rules.matches(["admin", "posts:new"]).unwrap());
    assert!(rules.evaluate(["admin", "posts", "new"]).unwrap().is_match());
}

#[test]
fn append_rules_in_structured_form() {
    let mut rules = Rules::new();
    rules.add(["admin", "posts", "*"]);
    rules.add(("admin", "users", "*"));
    rules.add(["admin:comments:[*]"]);
    rules.insert(("admin", "blog"), "new,create");

    assert!(rules.matches("admin:posts:new").unwrap());
    assert!(rules.matches("admin:users:new").unwrap());
    assert!(rules.matches("admin:comments:new").unwrap());
    assert!(rules.matches("admin:blog:new").unwrap());
    assert!(!rules.matches("admin:blog:destroy").unwrap());
}

#[test]
fn delete_rules_and_prune_emptied_groups() {
    let mut rules = Rules::new();
    rules.add(("admin", "posts", "*"));
    rules.insert(("admin", "comments"), "new,create");

    rules.delete(("admin", "posts", "*"));
    rules.delete(("admin", "comments", "new"));

    assert!(!rules.matches("admin:posts:new").unwrap());
    assert!(!rules.matches("admin:posts:create").unwrap());
    assert!(!rules.matches("admin:comments:new").unwrap());
    assert!(rules.matches("admin:comments:create").unwrap());

    rules.delete(("admin", "comments", "create"));
    assert!(!rules.matches("admin:comments:create").unwrap());
    assert!(!rules.matches("admin:comments").unwrap());
}

#[test]
fn insert_then_match_round_trip() {
    let mut rules = Rules::new();
    rules.insert(("billing", "invoices"), "create,void");
    assert!(rules.matches("billing:invoices:create").unwrap());
    assert!(rules.matches("billing:invoices:void").unwrap());

    rules.delete("billing:invoices:create");
    assert!(!rules.matches("billing:invoices:create").unwrap());
    assert!(rules.matches("billing:invoices:void").unwrap());
}

#[test]
fn readonly_view_composed_from_wildcard_and_subtraction() {
    let rules = load(
        r"
        all: '*'
        admin_only:
          admins: all
          organizations: [new, create, destroy]
          users: [new, edit, create, update, destroy]
        json: all
        html:
          admin: all
          readonly: all - admin_only
        ",
    )
    .unwrap();

    assert_eq!(
        trace(&rules, "html:readonly:organizations:index"),
        "[html, readonly, all - admin_only, \
         [admin_only, organizations, [new, create, destroy], mismatch], match]"
    );
    assert!(!rules.matches("html:readonly:organizations:create").unwrap());
    assert!(rules.matches("html:admin:organizations:create").unwrap());
    assert!(rules.matches("json:anything:at:all").unwrap());
}
