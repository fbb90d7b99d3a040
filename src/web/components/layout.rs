use maud::{html, Markup, DOCTYPE};

use crate::auth::session::SessionCookie;

/// Base HTML layout with Tailwind CSS
pub fn base(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="es" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " - FUNED" }

                script src="https://cdn.tailwindcss.com" {}

                script {
                    r#"
                    tailwind.config = {
                        theme: {
                            extend: {
                                colors: {
                                    primary: '#db2777',
                                    secondary: '#7c3aed',
                                }
                            }
                        }
                    }
                    "#
                }
            }
            body class="bg-gray-50 min-h-screen" {
                (content)
            }
        }
    }
}

pub fn logo() -> Markup {
    html! {
        a href="/" class="text-2xl font-bold text-primary" { "FUNED" }
    }
}

/// Top navigation. Links depend on who is logged in.
pub fn navbar(session: Option<&SessionCookie>, is_admin: bool) -> Markup {
    html! {
        nav class="bg-white shadow-sm border-b border-gray-200" {
            div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8" {
                div class="flex justify-between h-16" {
                    div class="flex items-center gap-6" {
                        (logo())
                        a href="/cursos" class="text-sm font-medium text-gray-700 hover:text-primary" { "Cursos" }
                        @if is_admin {
                            a href="/admin" class="text-sm font-medium text-gray-700 hover:text-primary" { "Administración" }
                        }
                        @if session.is_some() {
                            a href="/estudiante" class="text-sm font-medium text-gray-700 hover:text-primary" { "Mi panel" }
                        }
                    }

                    div class="flex items-center" {
                        @if let Some(session) = session {
                            div class="h-8 w-8 rounded-full bg-primary flex items-center justify-center text-white font-medium" {
                                (session.display_name().chars().next().unwrap_or('U').to_uppercase())
                            }
                            span class="ml-3 text-sm text-gray-700" { (session.display_name()) }
                            form action="/logout" method="post" class="ml-4" {
                                button type="submit" class="text-sm text-gray-500 hover:text-gray-700" {
                                    "Cerrar sesión"
                                }
                            }
                        } @else {
                            a href="/login" class="text-sm font-medium text-gray-700 hover:text-primary" { "Iniciar sesión" }
                            a href="/registro"
                                class="ml-4 inline-flex items-center px-4 py-2 text-sm font-medium rounded-md shadow-sm text-white bg-primary hover:bg-pink-700" {
                                "Registrarse"
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Container for main content
pub fn container(content: Markup) -> Markup {
    html! {
        div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 py-8" {
            (content)
        }
    }
}

/// Card component
pub fn card(title: &str, content: Markup) -> Markup {
    html! {
        div class="bg-white overflow-hidden shadow rounded-lg" {
            div class="px-4 py-5 sm:p-6" {
                h3 class="text-lg leading-6 font-medium text-gray-900 mb-4" {
                    (title)
                }
                (content)
            }
        }
    }
}

/// Button component
pub fn button(text: &str, button_type: &str, disabled: bool) -> Markup {
    let base_classes = "inline-flex justify-center py-2 px-4 border border-transparent shadow-sm text-sm font-medium rounded-md focus:outline-none focus:ring-2 focus:ring-offset-2 disabled:opacity-50";

    let color_classes = match button_type {
        "secondary" => "text-gray-700 bg-white border-gray-300 hover:bg-gray-50 focus:ring-gray-500",
        "danger" => "text-white bg-red-600 hover:bg-red-700 focus:ring-red-500",
        _ => "text-white bg-primary hover:bg-pink-700 focus:ring-primary",
    };

    html! {
        button
            type="submit"
            disabled[disabled]
            class=(format!("{} {}", base_classes, color_classes)) {
            (text)
        }
    }
}

/// Alert message component
pub fn alert(message: &str, alert_type: &str) -> Markup {
    let (bg_class, text_class, border_class) = match alert_type {
        "success" => ("bg-green-50", "text-green-800", "border-green-200"),
        "error" => ("bg-red-50", "text-red-800", "border-red-200"),
        "warning" => ("bg-yellow-50", "text-yellow-800", "border-yellow-200"),
        _ => ("bg-blue-50", "text-blue-800", "border-blue-200"),
    };

    html! {
        div class=(format!("rounded-md p-4 mb-4 border {} {}", bg_class, border_class)) role="alert" {
            p class=(format!("text-sm font-medium {}", text_class)) {
                (message)
            }
        }
    }
}

/// Overlay dialog. Closing is done by the links/forms inside it.
pub fn modal(title: &str, content: Markup) -> Markup {
    html! {
        div class="fixed inset-0 z-20 flex items-center justify-center bg-black bg-opacity-40" role="dialog" aria-modal="true" {
            div class="bg-white rounded-lg shadow-xl w-full max-w-lg p-6" {
                h3 class="text-lg font-semibold text-gray-900 mb-4" { (title) }
                (content)
            }
        }
    }
}

/// Statistic tile
pub fn stat(title: &str, value: &str) -> Markup {
    html! {
        div class="bg-white rounded-lg shadow p-4" {
            p class="text-sm text-gray-500" { (title) }
            p class="text-2xl font-bold text-gray-900" { (value) }
        }
    }
}

/// Full page for an error status (403, 404, ...)
pub fn error_page(code: &str, message: &str) -> Markup {
    base(
        code,
        html! {
            div class="min-h-screen flex items-center justify-center bg-gray-50" {
                div class="text-center" {
                    h1 class="text-6xl font-bold text-gray-900 mb-4" { (code) }
                    p class="text-xl text-gray-600 mb-8" { (message) }
                    a href="/" class="text-primary hover:text-pink-800 underline" {
                        "Volver al inicio"
                    }
                }
            }
        },
    )
}
