//! Permission Definitions
//!
//! Simplified RBAC permission system.
//!
//! ## 设计原则
//! - 基础操作（查看菜单、下单、出餐状态、开台）无需权限，登录即可使用
//! - 模块化权限：按功能模块授权
//! - 自定义角色 (role 表) 的权限在登录时与内置角色权限合并

/// 可配置权限列表
pub const ALL_PERMISSIONS: &[&str] = &[
    "menu:manage",      // 菜单与库存管理
    "tables:manage",    // 桌台、区域、虚拟桌台、预订
    "payments:process", // 结账
    "reports:view",     // 报表查看
    "settings:manage",  // 系统设置
];

/// Admin 专属权限（不在可配置列表中）
pub const ADMIN_ONLY_PERMISSIONS: &[&str] = &[
    "users:manage", // 用户、角色、权限、分组
    "all",          // 超级权限
];

/// Default role permissions
pub const DEFAULT_ADMIN_PERMISSIONS: &[&str] = &["all"];

pub const DEFAULT_CASHIER_PERMISSIONS: &[&str] = &["payments:process", "reports:view"];

pub const DEFAULT_WAITER_PERMISSIONS: &[&str] = &["payments:process"];

pub const DEFAULT_HOSTESS_PERMISSIONS: &[&str] = &["tables:manage"];

/// Get permissions for a built-in role name
pub fn get_default_permissions(role_name: &str) -> Vec<String> {
    let defaults: &[&str] = match role_name {
        "admin" => DEFAULT_ADMIN_PERMISSIONS,
        "cashier" => DEFAULT_CASHIER_PERMISSIONS,
        "waiter" => DEFAULT_WAITER_PERMISSIONS,
        "hostess" => DEFAULT_HOSTESS_PERMISSIONS,
        _ => &[],
    };
    defaults.iter().map(|s| s.to_string()).collect()
}

/// Built-in defaults plus custom role permissions, without duplicates
pub fn merge_permissions(role_name: &str, custom: &[String]) -> Vec<String> {
    let mut permissions = get_default_permissions(role_name);
    for p in custom {
        if !permissions.contains(p) {
            permissions.push(p.clone());
        }
    }
    permissions
}

/// Validate a permission name: `all` or `<module>:<action>`
pub fn is_valid_permission(permission: &str) -> bool {
    if ALL_PERMISSIONS.contains(&permission) || ADMIN_ONLY_PERMISSIONS.contains(&permission) {
        return true;
    }
    match permission.split_once(':') {
        Some((module, action)) => {
            !module.is_empty()
                && !action.is_empty()
                && !action.contains(':')
                && permission
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '-' | '*'))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_roles() {
        assert_eq!(get_default_permissions("admin"), vec!["all"]);
        assert!(get_default_permissions("cashier").contains(&"reports:view".to_string()));
        assert!(get_default_permissions("kitchen").is_empty());
    }

    #[test]
    fn merge_keeps_defaults_and_dedups() {
        let merged = merge_permissions(
            "cashier",
            &["reports:view".to_string(), "tables:manage".to_string()],
        );
        assert_eq!(merged, vec!["payments:process", "reports:view", "tables:manage"]);
    }

    #[test]
    fn permission_names() {
        assert!(is_valid_permission("menu:manage"));
        assert!(is_valid_permission("orders:*"));
        assert!(is_valid_permission("inventory:count"));
        assert!(!is_valid_permission("inventory"));
        assert!(!is_valid_permission("a:b:c"));
        assert!(!is_valid_permission("menu: manage"));
    }
}
